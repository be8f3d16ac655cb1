use crate::engine::Value;
use crate::error::ScalargradError;
use crate::sample::Sampler;
use itertools::Itertools;
use log::debug;
use std::iter::zip;

pub trait Module {
    fn zero_grad(&self) {
        self.parameters().iter().for_each(|p| p.reset_grad())
    }

    fn parameters(&self) -> Vec<Value>;
}

/// Nonlinearity applied to each neuron's pre-activation. Bound once at layer
/// construction; an unsupported choice is unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    Tanh,
    Relu,
    Sigmoid,
}

impl Activation {
    fn apply(self, value: &Value) -> Value {
        match self {
            Activation::Tanh => value.tanh(),
            Activation::Relu => value.relu(),
            Activation::Sigmoid => value.sigmoid(),
        }
    }
}

/// Fully-connected layer: `nout` neurons over `nin` inputs, one bias per
/// neuron, weights stored flat in row-major order (one row per neuron).
pub struct Layer {
    nin: usize,
    nout: usize,
    weights: Vec<Value>,
    biases: Vec<Value>,
    activation: Activation,
}

impl Layer {
    /// Initializes every weight, then every bias, from `sampler`.
    pub fn new(sampler: &mut dyn Sampler, nin: usize, nout: usize, activation: Activation) -> Self {
        debug!("creating {nin}x{nout} layer with {activation:?} activation");
        let weights = (0..nin * nout).map(|_| Value::new(sampler.get())).collect();
        let biases = (0..nout).map(|_| Value::new(sampler.get())).collect();
        Self {
            nin,
            nout,
            weights,
            biases,
            activation,
        }
    }

    /// Dot product of each neuron's weight row with `inputs`, plus bias,
    /// through the activation.
    pub fn forward(&self, inputs: &[Value]) -> Result<Vec<Value>, ScalargradError> {
        if inputs.len() != self.nin {
            return Err(ScalargradError::ShapeMismatch {
                expected: self.nin,
                actual: inputs.len(),
            });
        }

        let outputs = (0..self.nout)
            .map(|neuron| {
                let row = &self.weights[neuron * self.nin..(neuron + 1) * self.nin];
                let sum = zip(row, inputs)
                    .map(|(wi, xi)| wi.clone() * xi.clone())
                    .fold(self.biases[neuron].clone(), |acc, term| acc + term);
                self.activation.apply(&sum)
            })
            .collect();

        Ok(outputs)
    }
}

impl Module for Layer {
    /// Aliased handles, weights first then biases; updates through them are
    /// visible inside the layer.
    fn parameters(&self) -> Vec<Value> {
        self.weights
            .iter()
            .chain(self.biases.iter())
            .cloned()
            .collect()
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Layer ({} inputs, {} neuron(s), {:?}):",
            self.nin, self.nout, self.activation
        )?;
        for neuron in 0..self.nout {
            let row = &self.weights[neuron * self.nin..(neuron + 1) * self.nin];
            writeln!(
                f,
                "    weights: {}, bias: {:.6}",
                row.iter().map(|w| format!("{:.6}", w.data())).join(" "),
                self.biases[neuron].data()
            )?;
        }
        Ok(())
    }
}
