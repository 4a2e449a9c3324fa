use std::collections::HashMap;
use std::path::Path;

use ndarray::{arr1, Array2};
use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, CoreMLExecutionProvider,
    ExecutionProviderDispatch,
};
use ort::inputs;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use super::metadata::{VitsMetadata, METADATA_KEYS};
use super::params::Scales;
use crate::config::Provider;
use crate::TtsError;

/// Internal VITS ONNX model state.
pub struct VitsModel {
    session: Session,
    metadata: VitsMetadata,
    /// True if the graph takes a `sid` input (multi-speaker voices)
    has_sid: bool,
}

impl VitsModel {
    pub fn load(
        onnx_path: &Path,
        provider: Provider,
        num_threads: usize,
    ) -> Result<Self, TtsError> {
        log::info!("Loading VITS model from {}", onnx_path.display());

        let session = init_session(onnx_path, provider, num_threads)?;

        let custom = {
            let metadata = session.metadata()?;
            let mut custom = HashMap::new();
            for key in METADATA_KEYS {
                if let Some(value) = metadata.custom(key)? {
                    custom.insert(key.to_string(), value);
                }
            }
            custom
        };
        let metadata = VitsMetadata::from_map(&custom)?;
        let has_sid = session.inputs().iter().any(|input| input.name() == "sid");

        log::info!(
            "Detected: sample_rate={}, speakers={}, add_blank={}, sid_input={}",
            metadata.sample_rate,
            metadata.num_speakers,
            metadata.add_blank,
            has_sid
        );

        Ok(Self {
            session,
            metadata,
            has_sid,
        })
    }

    pub fn metadata(&self) -> &VitsMetadata {
        &self.metadata
    }

    /// Run the model on one token sequence and return the waveform.
    pub fn run(
        &mut self,
        tokens: &[i64],
        speaker_id: i64,
        scales: Scales,
    ) -> Result<Vec<f32>, TtsError> {
        let x = Array2::from_shape_vec((1, tokens.len()), tokens.to_vec())?;
        let x_length = arr1(&[tokens.len() as i64]);
        let noise_scale = arr1(&[scales.noise_scale]);
        let length_scale = arr1(&[scales.length_scale]);
        let noise_scale_w = arr1(&[scales.noise_scale_w]);

        let output = if self.has_sid {
            let sid = arr1(&[speaker_id]);
            let inputs = inputs![
                "x" => TensorRef::from_array_view(x.view())?,
                "x_length" => TensorRef::from_array_view(x_length.view())?,
                "noise_scale" => TensorRef::from_array_view(noise_scale.view())?,
                "length_scale" => TensorRef::from_array_view(length_scale.view())?,
                "noise_scale_w" => TensorRef::from_array_view(noise_scale_w.view())?,
                "sid" => TensorRef::from_array_view(sid.view())?,
            ];
            self.session.run(inputs)?
        } else {
            let inputs = inputs![
                "x" => TensorRef::from_array_view(x.view())?,
                "x_length" => TensorRef::from_array_view(x_length.view())?,
                "noise_scale" => TensorRef::from_array_view(noise_scale.view())?,
                "length_scale" => TensorRef::from_array_view(length_scale.view())?,
                "noise_scale_w" => TensorRef::from_array_view(noise_scale_w.view())?,
            ];
            self.session.run(inputs)?
        };

        // First output is the waveform, shaped [1, 1, samples]
        let first_output = output
            .iter()
            .next()
            .ok_or_else(|| TtsError::Ort(ort::Error::new("No output from model")))?;
        let waveform = first_output.1.try_extract_array::<f32>()?;

        Ok(waveform.iter().copied().collect())
    }
}

fn execution_providers(provider: Provider) -> Vec<ExecutionProviderDispatch> {
    match provider {
        Provider::Cpu => vec![CPUExecutionProvider::default().build()],
        Provider::Cuda => vec![
            CUDAExecutionProvider::default().build(),
            CPUExecutionProvider::default().build(),
        ],
        Provider::Coreml => vec![
            CoreMLExecutionProvider::default().build(),
            CPUExecutionProvider::default().build(),
        ],
    }
}

fn init_session(
    onnx_path: &Path,
    provider: Provider,
    num_threads: usize,
) -> Result<Session, TtsError> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_execution_providers(execution_providers(provider))?
        .with_intra_threads(num_threads)?
        .with_inter_threads(1)?
        .commit_from_file(onnx_path)?;
    Ok(session)
}
