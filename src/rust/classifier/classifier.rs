use std::sync::Arc;

use super::error::ClassifierError;
use super::model::ImageModel;
use super::preprocess::preprocess;
use crate::labels::{ClassLabel, DiseaseInfo};

/// The outcome of classifying a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub label: ClassLabel,
    /// Probability of `label`, always within `[0.0, 1.0]`.
    pub probability: f32,
    /// The full distribution, indexed like [`ClassLabel::ALL`].
    pub probabilities: Vec<f32>,
}

impl PredictionResult {
    pub fn info(&self) -> &'static DiseaseInfo {
        self.label.info()
    }
}

/// A thread-safe skin lesion classifier.
///
/// # Thread Safety
///
/// The model is held behind an `Arc` and only ever called through `&self`, so a
/// `Classifier` can be wrapped in an `Arc` and shared across request handlers
/// without locking.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use skinsight::Classifier;
///
/// let classifier = Classifier::builder()
///     .with_model_path("model/model.onnx")
///     .build()?;
///
/// let bytes = std::fs::read("lesion.jpg")?;
/// let result = classifier.predict(&bytes)?;
/// println!("{} ({:.1}%)", result.label, result.probability * 100.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    pub model_path: Option<String>,
    pub model: Arc<dyn ImageModel>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            model_path: self.model_path.clone(),
            num_classes: ClassLabel::COUNT,
            class_labels: ClassLabel::ALL.iter().map(|label| label.as_str().to_string()).collect(),
        }
    }

    /// Classifies an encoded image (PNG, JPEG, ...).
    ///
    /// # Errors
    /// - `ValidationError` / `ImageError` if the bytes are not a decodable image
    /// - `ModelError` if inference fails
    /// - `PredictionError` if the model output is not a valid distribution
    pub fn predict(&self, image_bytes: &[u8]) -> Result<PredictionResult, ClassifierError> {
        let input = preprocess(image_bytes)?;
        let probabilities = self.model.probabilities(&input)?;
        select(probabilities)
    }
}

/// Picks the most probable class from a model output vector.
///
/// Ties resolve to the lowest index. The vector must contain exactly one
/// finite score per [`ClassLabel`] and the winning score must lie in `[0, 1]`.
pub fn select(probabilities: Vec<f32>) -> Result<PredictionResult, ClassifierError> {
    if probabilities.len() != ClassLabel::COUNT {
        return Err(ClassifierError::PredictionError(format!(
            "Model returned {} scores, expected {}",
            probabilities.len(),
            ClassLabel::COUNT
        )));
    }
    if let Some(pos) = probabilities.iter().position(|p| !p.is_finite()) {
        return Err(ClassifierError::PredictionError(format!(
            "Score at index {} is not finite",
            pos
        )));
    }

    let (best_index, best_score) = probabilities
        .iter()
        .copied()
        .enumerate()
        .fold((0, probabilities[0]), |best, (i, p)| if p > best.1 { (i, p) } else { best });

    if !(0.0..=1.0).contains(&best_score) {
        return Err(ClassifierError::PredictionError(format!(
            "Score {} is not a probability; the model must end in a softmax",
            best_score
        )));
    }

    let label = ClassLabel::from_index(best_index)
        .ok_or_else(|| ClassifierError::PredictionError(format!("No label for index {}", best_index)))?;

    Ok(PredictionResult {
        label,
        probability: best_score,
        probabilities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::ClassLabel;
    use ndarray::Array4;

    #[derive(Debug)]
    struct FixedScores(Vec<f32>);

    impl ImageModel for FixedScores {
        fn probabilities(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
            assert_eq!(input.shape(), &[1, 224, 224, 3]);
            Ok(self.0.clone())
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([180, 90, 70]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_select_melanoma() {
        let result = select(vec![0.05, 0.02, 0.03, 0.01, 0.02, 0.80, 0.03, 0.02, 0.02]).unwrap();
        assert_eq!(result.label, ClassLabel::Melanoma);
        assert!((result.probability - 0.80).abs() < 1e-6);
        assert_eq!(result.probabilities.len(), 9);
    }

    #[test]
    fn test_select_tie_prefers_lowest_index() {
        let result = select(vec![0.1, 0.3, 0.0, 0.3, 0.0, 0.0, 0.3, 0.0, 0.0]).unwrap();
        assert_eq!(result.label, ClassLabel::AtopicDermatitis);

        let uniform = select(vec![1.0 / 9.0; 9]).unwrap();
        assert_eq!(uniform.label, ClassLabel::ActinicKeratosis);
    }

    #[test]
    fn test_select_rejects_bad_output() {
        assert!(matches!(select(vec![0.5, 0.5]), Err(ClassifierError::PredictionError(_))));
        assert!(matches!(select(Vec::new()), Err(ClassifierError::PredictionError(_))));

        let mut with_nan = vec![0.1; 9];
        with_nan[4] = f32::NAN;
        assert!(matches!(select(with_nan), Err(ClassifierError::PredictionError(_))));

        let mut logits = vec![0.0; 9];
        logits[2] = 4.2;
        assert!(matches!(select(logits), Err(ClassifierError::PredictionError(_))));
    }

    #[test]
    fn test_predict_with_stub_model() {
        let mut scores = vec![0.0; 9];
        scores[8] = 0.9;
        scores[0] = 0.1;
        let classifier = Classifier::builder()
            .with_model(FixedScores(scores))
            .build()
            .unwrap();

        let result = classifier.predict(&png_bytes()).unwrap();
        assert_eq!(result.label, ClassLabel::VascularLesion);
        assert_eq!(result.info().description, ClassLabel::VascularLesion.info().description);
    }

    #[test]
    fn test_class_info() {
        let classifier = Classifier::builder()
            .with_model(FixedScores(vec![0.0; 9]))
            .build()
            .unwrap();
        let info = classifier.info();
        assert_eq!(info.num_classes, 9);
        assert_eq!(info.class_labels[5], "Melanoma");
        assert!(info.model_path.is_none());
    }
}
