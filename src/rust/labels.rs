//! Static metadata for the skin conditions the model can predict.
//!
//! The table is built once on first access and never mutated afterwards, so it
//! can be read from any number of request handlers without synchronization.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;

use crate::classifier::ClassifierError;

/// Description and handling advice shown alongside a prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseInfo {
    pub description: &'static str,
    pub handling: &'static str,
}

/// Returned for any label that has no entry in the table.
pub const FALLBACK_INFO: DiseaseInfo = DiseaseInfo {
    description: "Informasi tidak tersedia.",
    handling: "Konsultasikan ke dokter.",
};

/// The classes emitted by the model, in output-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassLabel {
    ActinicKeratosis,
    AtopicDermatitis,
    BenignKeratosis,
    Dermatofibroma,
    MelanocyticNevus,
    Melanoma,
    SquamousCellCarcinoma,
    TineaRingwormCandidiasis,
    VascularLesion,
}

impl ClassLabel {
    /// Every label, indexed the same way as the model's output vector.
    pub const ALL: [ClassLabel; 9] = [
        ClassLabel::ActinicKeratosis,
        ClassLabel::AtopicDermatitis,
        ClassLabel::BenignKeratosis,
        ClassLabel::Dermatofibroma,
        ClassLabel::MelanocyticNevus,
        ClassLabel::Melanoma,
        ClassLabel::SquamousCellCarcinoma,
        ClassLabel::TineaRingwormCandidiasis,
        ClassLabel::VascularLesion,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::ActinicKeratosis => "Actinic keratosis",
            ClassLabel::AtopicDermatitis => "Atopic Dermatitis",
            ClassLabel::BenignKeratosis => "Benign keratosis",
            ClassLabel::Dermatofibroma => "Dermatofibroma",
            ClassLabel::MelanocyticNevus => "Melanocytic nevus",
            ClassLabel::Melanoma => "Melanoma",
            ClassLabel::SquamousCellCarcinoma => "Squamous cell carcinoma",
            ClassLabel::TineaRingwormCandidiasis => "Tinea Ringworm Candidiasis",
            ClassLabel::VascularLesion => "Vascular lesion",
        }
    }

    pub fn info(self) -> &'static DiseaseInfo {
        lookup(self.as_str())
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassLabel {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| ClassifierError::ValidationError(format!("Unknown class label: {}", s)))
    }
}

lazy_static! {
    static ref DISEASE_INFO: HashMap<&'static str, DiseaseInfo> = {
        let mut table = HashMap::with_capacity(ClassLabel::COUNT);
        table.insert("Actinic keratosis", DiseaseInfo {
            description: "Actinic keratosis adalah kondisi kulit praser kanker yang disebabkan oleh paparan sinar matahari berlebih.",
            handling: "Gunakan pelindung kulit seperti sunscreen SPF tinggi, dan konsultasikan ke dokter untuk cryotherapy atau pengobatan topikal.",
        });
        table.insert("Atopic Dermatitis", DiseaseInfo {
            description: "Atopic Dermatitis adalah peradangan kulit kronis yang menyebabkan kulit kering, gatal, dan ruam.",
            handling: "Hindari alergen dan gunakan pelembap. Jika parah, gunakan krim steroid atau konsultasikan ke dokter untuk terapi imunosupresif.",
        });
        table.insert("Benign keratosis", DiseaseInfo {
            description: "Benign keratosis adalah lesi kulit jinak yang biasanya muncul akibat penuaan atau paparan sinar matahari.",
            handling: "Tidak memerlukan pengobatan khusus kecuali untuk alasan kosmetik. Dapat dilakukan pengangkatan dengan cryotherapy atau laser.",
        });
        table.insert("Dermatofibroma", DiseaseInfo {
            description: "Dermatofibroma adalah nodul kulit jinak yang biasanya muncul pada kaki atau lengan.",
            handling: "Tidak memerlukan pengobatan kecuali mengganggu. Untuk alasan kosmetik, dapat diangkat melalui pembedahan.",
        });
        table.insert("Melanocytic nevus", DiseaseInfo {
            description: "Melanocytic nevus adalah tahi lalat atau lesi kulit jinak yang mengandung melanosit.",
            handling: "Pantau perubahan bentuk, warna, atau ukuran. Jika mencurigakan, segera konsultasikan ke dokter untuk biopsi.",
        });
        table.insert("Melanoma", DiseaseInfo {
            description: "Melanoma adalah kanker kulit yang sangat serius, berkembang dari sel penghasil pigmen (melanosit).",
            handling: "Segera konsultasikan ke dokter kulit. Penanganan melibatkan pembedahan, imunoterapi, atau kemoterapi, tergantung stadium.",
        });
        table.insert("Squamous cell carcinoma", DiseaseInfo {
            description: "Squamous cell carcinoma adalah jenis kanker kulit yang muncul pada lapisan luar kulit.",
            handling: "Penanganan termasuk eksisi bedah, radioterapi, atau terapi topikal, tergantung pada tingkat keparahan.",
        });
        table.insert("Tinea Ringworm Candidiasis", DiseaseInfo {
            description: "Tinea atau Candidiasis adalah infeksi jamur yang menyebabkan ruam berbentuk cincin pada kulit.",
            handling: "Gunakan obat antijamur topikal atau oral. Jaga area tetap kering dan bersih untuk mencegah infeksi berulang.",
        });
        table.insert("Vascular lesion", DiseaseInfo {
            description: "Vascular lesion adalah kelainan pembuluh darah pada kulit, seperti angioma atau malformasi vena.",
            handling: "Penanganan melibatkan observasi, skleroterapi, atau pengangkatan laser, tergantung pada jenis lesi dan gejala.",
        });
        table
    };
}

/// Looks up the metadata for `label`, falling back to [`FALLBACK_INFO`].
///
/// The lookup is total: it never fails.
pub fn lookup(label: &str) -> &'static DiseaseInfo {
    DISEASE_INFO.get(label).unwrap_or(&FALLBACK_INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_label_has_info() {
        for label in ClassLabel::ALL {
            let info = label.info();
            assert_ne!(info, &FALLBACK_INFO, "missing entry for {}", label);
            assert!(info.description.starts_with(label.as_str().split(' ').next().unwrap()));
        }
    }

    #[test]
    fn test_index_round_trip() {
        for (i, label) in ClassLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(ClassLabel::from_index(i), Some(*label));
        }
        assert_eq!(ClassLabel::from_index(ClassLabel::COUNT), None);
    }

    #[test]
    fn test_unknown_label_falls_back() {
        let info = lookup("Psoriasis");
        assert_eq!(info.description, "Informasi tidak tersedia.");
        assert_eq!(info.handling, "Konsultasikan ke dokter.");
        // Lookup is case sensitive, like the table keys.
        assert_eq!(lookup("melanoma"), &FALLBACK_INFO);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!("Melanoma".parse::<ClassLabel>().unwrap(), ClassLabel::Melanoma);
        assert!(matches!(
            "Acne".parse::<ClassLabel>(),
            Err(ClassifierError::ValidationError(_))
        ));
    }
}
