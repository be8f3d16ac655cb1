extern crate scalargrad;

use float_eq::*;
use scalargrad::engine::Value;

// Golden values for these graphs are seed-independent; the first two come
// from micrograd's reference sanity checks.

#[test]
fn sanity_check() {
    let x = Value::new(-4.0);
    let z = 2. * x.clone() + 2. + x.clone();
    let q = z.relu() + z.clone() * x.clone();
    let h = (z.clone() * z.clone()).relu();
    let y = h + q.clone() + q * x.clone();
    y.backward();

    assert_float_eq!(y.data(), -20.0, abs <= 1e-10);
    assert_float_eq!(x.grad(), 46.0, abs <= 1e-10);
}

#[test]
fn more_ops() {
    let a = Value::new(-4.0);
    let b = Value::new(2.0);
    let mut c = a.clone() + b.clone();
    let mut d = a.clone() * b.clone() + b.pow(3.);
    c = c.clone() + c.clone() + 1.;
    c = c.clone() + 1. + c.clone() + -a.clone();
    d = d.clone() + d.clone() * 2. + (b.clone() + a.clone()).relu();
    d = d.clone() + 3. * d.clone() + (b.clone() - a.clone()).relu();
    let e = c - d;
    let f = e.pow(2.);
    let mut g = f.clone() / 2.0;
    g = g + 10.0 / f;
    g.backward();

    let tol = 1e-6;
    assert_float_eq!(g.data(), 24.70408163265306, abs <= tol);
    assert_float_eq!(a.grad(), 138.83381924198252, abs <= tol);
    assert_float_eq!(b.grad(), 645.5772594752186, abs <= tol);
}

#[test]
fn tanh_neuron() {
    let x1 = Value::new(2.0);
    let x2 = Value::new(0.0);
    let w1 = Value::new(-3.0);
    let w2 = Value::new(1.0);
    let b = Value::new(6.881_373_587_019_543);
    let n = x1.clone() * w1.clone() + x2.clone() * w2.clone() + b;
    let o = n.tanh();
    o.backward();

    assert_float_eq!(o.data(), 0.707_106_781_186_547_6, abs <= 1e-6);
    assert_float_eq!(x1.grad(), -1.5, abs <= 1e-6);
    assert_float_eq!(w1.grad(), 1.0, abs <= 1e-6);
    assert_float_eq!(x2.grad(), 0.5, abs <= 1e-6);
    assert_float_eq!(w2.grad(), 0.0, abs <= 1e-6);
}
