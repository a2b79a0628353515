use image::imageops::{self, FilterType};
use ndarray::Array4;
use shared::Diagnosis;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tch::{CModule, Device, Kind, Tensor};

/// Side of the square input the classifier expects.
pub const INPUT_SIZE: u32 = 224;

/// Order of the scores a classifier returns.
pub const CLASS_LABELS: [Diagnosis; 6] = [
    Diagnosis::Calcium,
    Diagnosis::Healthy,
    Diagnosis::Magnesium,
    Diagnosis::Nitrogen,
    Diagnosis::Phosphorus,
    Diagnosis::Potassium,
];

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model not loaded")]
    NotLoaded,
    #[error("{0}")]
    Preprocessing(#[from] image::ImageError),
    #[error("{0}")]
    Model(#[from] tch::TchError),
    #[error("Model lock poisoned")]
    Poisoned,
    #[error("Model returned {got} scores for {expected} classes")]
    OutputShape { expected: usize, got: usize },
}

/// Inference runtime behind the service. Takes a `(1, 224, 224, 3)` batch
/// of RGB values in [0, 1] and returns one score per `CLASS_LABELS` entry.
pub trait Classifier: Send + Sync {
    fn forward(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}

/// TorchScript export of the classifier. Its output is treated as logits
/// and passed through a softmax.
pub struct TorchClassifier {
    module: Mutex<CModule>,
    device: Device,
}

impl TorchClassifier {
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let device = Device::cuda_if_available();
        let module = CModule::load_on_device(model_path, device)?;
        Ok(Self {
            module: Mutex::new(module),
            device,
        })
    }
}

impl Classifier for TorchClassifier {
    fn forward(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let side = INPUT_SIZE as i64;
        let pixels: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_slice(&pixels)
            .reshape([1, side, side, 3])
            .to_device(self.device);

        let output = self
            .module
            .lock()
            .map_err(|_| InferenceError::Poisoned)?
            .forward_ts(&[tensor])?;
        let scores = output
            .softmax(-1, Kind::Float)
            .view([-1])
            .to_device(Device::Cpu);

        Ok(Vec::<f32>::try_from(&scores)?)
    }
}

#[derive(Clone)]
pub struct Model {
    classifier: Option<Arc<dyn Classifier>>,
}

impl Model {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    /// Loads the TorchScript model at `model_path`. A model that cannot be
    /// loaded leaves the service up with `/predict` answering 503.
    pub fn load(model_path: &str) -> Self {
        match TorchClassifier::load(model_path) {
            Ok(classifier) => {
                log::info!("Model loaded from {}", model_path);
                Self::new(Arc::new(classifier))
            }
            Err(e) => {
                log::warn!("Failed to load model from {}: {}", model_path, e);
                Self::unloaded()
            }
        }
    }

    pub fn unloaded() -> Self {
        Self { classifier: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn inference(&self, image: &[u8]) -> Result<Vec<f32>, InferenceError> {
        let classifier = self.classifier.as_ref().ok_or(InferenceError::NotLoaded)?;
        let tensor = preprocess(image)?;
        let scores = classifier.forward(&tensor)?;

        if scores.len() != CLASS_LABELS.len() {
            return Err(InferenceError::OutputShape {
                expected: CLASS_LABELS.len(),
                got: scores.len(),
            });
        }
        Ok(scores)
    }

    /// Highest-scoring class and its score. Ties go to the earlier label.
    pub fn calculate_result(&self, scores: &[f32]) -> (Diagnosis, f32) {
        CLASS_LABELS
            .iter()
            .copied()
            .zip(scores.iter().copied())
            .reduce(|best, next| if next.1 > best.1 { next } else { best })
            .unwrap_or((Diagnosis::Healthy, 0.0))
    }
}

/// Decodes, converts to RGB, resizes to 224x224 and scales to [0, 1].
pub fn preprocess(image: &[u8]) -> Result<Array4<f32>, InferenceError> {
    let rgb = image::load_from_memory(image)?.to_rgb8();
    let resized = imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    let side = INPUT_SIZE as usize;

    Ok(Array4::from_shape_fn((1, side, side, 3), |(_, y, x, c)| {
        f32::from(resized.get_pixel(x as u32, y as u32).0[c]) / 255.0
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    /// Returns the same scores for every image.
    pub struct FixedClassifier(pub Vec<f32>);

    impl Classifier for FixedClassifier {
        fn forward(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
            assert_eq!(input.shape(), &[1, 224, 224, 3]);
            Ok(self.0.clone())
        }
    }

    pub fn png_bytes() -> Vec<u8> {
        let leaf = ImageBuffer::from_pixel(8, 6, Rgb([255u8, 0, 51]));
        let mut bytes = Vec::new();
        leaf.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn preprocess_resizes_and_normalises() {
        let tensor = preprocess(&png_bytes()).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert!((tensor[[0, 100, 100, 0]] - 1.0).abs() < 0.01);
        assert!(tensor[[0, 100, 100, 1]].abs() < 0.01);
        assert!((tensor[[0, 0, 0, 2]] - 0.2).abs() < 0.01);
    }

    #[test]
    fn preprocess_rejects_non_images() {
        assert!(matches!(
            preprocess(b"definitely not a picture"),
            Err(InferenceError::Preprocessing(_))
        ));
    }

    #[test]
    fn calculate_result_picks_argmax() {
        let model = Model::unloaded();
        let (label, score) = model.calculate_result(&[0.1, 0.05, 0.05, 0.6, 0.15, 0.05]);
        assert_eq!(label, Diagnosis::Nitrogen);
        assert!((score - 0.6).abs() < 1e-6);
    }

    #[test]
    fn calculate_result_breaks_ties_towards_the_first_label() {
        let model = Model::unloaded();
        let (label, _) = model.calculate_result(&[0.1, 0.4, 0.4, 0.05, 0.05, 0.0]);
        assert_eq!(label, Diagnosis::Healthy);

        let (label, score) = model.calculate_result(&[0.25, 0.25, 0.25, 0.25, 0.0, 0.0]);
        assert_eq!(label, Diagnosis::Calcium);
        assert!((score - 0.25).abs() < 1e-6);
    }

    #[test]
    fn missing_model_file_leaves_service_unloaded() {
        assert!(matches!(
            TorchClassifier::load("/nonexistent/chilli_nutrient_model.pt"),
            Err(InferenceError::Model(_))
        ));
        assert!(!Model::load("/nonexistent/chilli_nutrient_model.pt").is_loaded());
    }

    #[test]
    fn inference_requires_a_classifier() {
        assert!(matches!(
            Model::unloaded().inference(&png_bytes()),
            Err(InferenceError::NotLoaded)
        ));
    }

    #[test]
    fn inference_checks_output_width() {
        let model = Model::new(Arc::new(FixedClassifier(vec![1.0, 0.0])));
        assert!(matches!(
            model.inference(&png_bytes()),
            Err(InferenceError::OutputShape {
                expected: 6,
                got: 2
            })
        ));
    }
}
