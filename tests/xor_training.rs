extern crate scalargrad;

use scalargrad::engine::Value;
use scalargrad::loss::binary_cross_entropy;
use scalargrad::nn::{Activation, Layer, Module};
use scalargrad::sample::UniformSampler;

const XOR_ROWS: [([f64; 2], f64); 4] = [
    ([0., 0.], 0.),
    ([1., 0.], 1.),
    ([0., 1.], 1.),
    ([1., 1.], 0.),
];

#[test]
fn xor_training_loss_decreases() {
    let mut sampler = UniformSampler::default();
    let hidden = Layer::new(&mut sampler, 2, 2, Activation::Tanh);
    let output = Layer::new(&mut sampler, 2, 1, Activation::Sigmoid);
    let alpha = 0.1;

    let mut losses = vec![];
    for _ in 0..25 {
        let mut loss_sum = 0.;
        for (inputs, target) in &XOR_ROWS {
            let inputs: Vec<Value> = inputs.iter().map(|&x| Value::new(x)).collect();
            let prediction = output
                .forward(&hidden.forward(&inputs).unwrap())
                .unwrap()[0]
                .clone();
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

        losses.push(loss_sum / XOR_ROWS.len() as f64);
    }

    assert!(losses.iter().all(|loss| loss.is_finite()));

    // Batch descent at this rate must not climb in the early epochs and has
    // to make net progress by the end.
    for pair in losses[..8].windows(2) {
        assert!(pair[1] <= pair[0] + 1e-9, "loss rose early: {losses:?}");
    }
    assert!(losses.last().unwrap() < losses.first().unwrap());
}
