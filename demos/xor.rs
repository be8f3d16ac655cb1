extern crate scalargrad;

use color_eyre::eyre::Result;
use scalargrad::engine::Value;
use scalargrad::loss::binary_cross_entropy;
use scalargrad::nn::{Activation, Layer, Module};
use scalargrad::sample::UniformSampler;

fn main() -> Result<()> {
    color_eyre::install()?;

    let mut sampler = UniformSampler::default();
    let hidden = Layer::new(&mut sampler, 2, 2, Activation::Tanh);
    let output = Layer::new(&mut sampler, 2, 1, Activation::Sigmoid);

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
            let inputs: Vec<Value> = inputs.iter().map(|&x| Value::new(x)).collect();
            let prediction = output.forward(&hidden.forward(&inputs)?)?[0].clone();
            let loss = binary_cross_entropy(&prediction, &Value::new(*target));
            loss.backward();
            loss_sum += loss.data();
        }

        for parameter in hidden
            .parameters()
            .iter()
            .chain(output.parameters().iter())
        {
            parameter.set_data(parameter.data() - parameter.grad() * alpha);
            parameter.reset_grad();
        }

        println!("epoch {epoch}: mean loss {:.6}", loss_sum / rows.len() as f64);
    }

    println!("{hidden}");
    println!("{output}");

    Ok(())
}
