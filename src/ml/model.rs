use burn::{
    nn::{
        loss::{MseLoss, Reduction},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

use crate::domain::hyperparams::HyperparameterConfiguration;
use crate::error::TuneResult;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct HestonRegressorConfig {
    pub input_dim:    usize,
    pub hidden_width: usize,
    pub output_dim:   usize,
    #[config(default = 0.0)]
    pub dropout:      f64,
}

impl HestonRegressorConfig {
    /// Architecture for one sampled configuration.
    pub fn from_hyperparameters(
        hp:         &HyperparameterConfiguration,
        input_dim:  usize,
        output_dim: usize,
    ) -> TuneResult<Self> {
        Ok(Self::new(input_dim, hp.layer_size()?, output_dim).with_dropout(hp.dropout_rate()?))
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> HestonRegressor<B> {
        HestonRegressor {
            hidden:  LinearConfig::new(self.input_dim, self.hidden_width).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            output:  LinearConfig::new(self.hidden_width, self.output_dim).init(device),
        }
    }
}

/// dense(width) → ReLU → dropout → dense(K), no output activation.
#[derive(Module, Debug)]
pub struct HestonRegressor<B: Backend> {
    pub hidden:  Linear<B>,
    pub dropout: Dropout,
    pub output:  Linear<B>,
}

impl<B: Backend> HestonRegressor<B> {
    /// features: [batch, D] → predictions: [batch, K]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = burn::tensor::activation::relu(self.hidden.forward(features));
        // Dropout is only active on an autodiff backend; model.valid() disables it.
        let x = self.dropout.forward(x);
        self.output.forward(x)
    }

    /// Mean squared error over every element of the batch
    pub fn forward_loss(&self, features: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        let predictions = self.forward(features);
        MseLoss::new().forward(predictions, targets, Reduction::Mean)
    }
}
