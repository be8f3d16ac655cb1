extern crate scalargrad;

use color_eyre::eyre::Result;
use scalargrad::engine::Value;
use scalargrad::sample::{Sampler, UniformSampler};

/// Hand-wired 2-2-1 network. The six weights live here, owned by the
/// training loop, instead of floating around as globals.
struct TinyNet {
    // first layer, neuron 1
    w11_1: Value,
    w12_1: Value,
    // first layer, neuron 2
    w21_1: Value,
    w22_1: Value,
    // output neuron
    w11_2: Value,
    w12_2: Value,
}

impl TinyNet {
    fn new(sampler: &mut dyn Sampler) -> Self {
        Self {
            w11_1: Value::new(sampler.get()),
            w12_1: Value::new(sampler.get()),
            w21_1: Value::new(sampler.get()),
            w22_1: Value::new(sampler.get()),
            w11_2: Value::new(sampler.get()),
            w12_2: Value::new(sampler.get()),
        }
    }

    fn parameters(&self) -> [Value; 6] {
        [
            self.w11_1.clone(),
            self.w12_1.clone(),
            self.w21_1.clone(),
            self.w22_1.clone(),
            self.w11_2.clone(),
            self.w12_2.clone(),
        ]
    }

    /// Forward pass straight through to the log loss.
    fn loss(&self, x1: Value, x2: Value, y: Value) -> Value {
        let o1 = (self.w11_1.clone() * x1.clone() + self.w12_1.clone() * x2.clone()).tanh();
        let o2 = (self.w21_1.clone() * x1 + self.w22_1.clone() * x2).tanh();
        let o3 = (self.w11_2.clone() * o1 + self.w12_2.clone() * o2).sigmoid();

        // 1e-15 offset keeps a saturated output away from log(0)
        let log_likelihood = (y.clone() * (o3.clone() + 1.0e-15).log()
            + (1.0 - y) * (1.0 - o3 + 1.0e-15).log())
            / 2.0;
        -log_likelihood
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let mut sampler = UniformSampler::default();
    let net = TinyNet::new(&mut sampler);

    let rows = [
        ([0., 0.], 0.),
        ([1., 0.], 1.),
        ([0., 1.], 1.),
        ([1., 1.], 0.),
    ];
    let alpha = 0.1;

    for epoch in 0..10 {
        let mut loss_sum = 0.;
        for (inputs, target) in &rows {
            let loss = net.loss(
                Value::new(inputs[0]),
                Value::new(inputs[1]),
                Value::new(*target),
            );
            loss.backward();
            loss_sum += loss.data();
        }

        for parameter in net.parameters() {
            parameter.set_data(parameter.data() - parameter.grad() * alpha);
            parameter.reset_grad();
        }

        println!("epoch {epoch}: mean loss {:.6}", loss_sum / rows.len() as f64);
    }

    Ok(())
}
