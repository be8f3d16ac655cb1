use log::trace;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

pub type ValueId = usize;

pub type ValueType = f64;

/// Local gradient rule of one graph node. Receives the node's operands, its
/// forward value and its accumulated gradient, and adds the scaled
/// contribution into each operand's gradient.
type BackwardRule = fn(&[Value], ValueType, ValueType);

struct Node {
    data: ValueType,
    grad: ValueType,
    operands: Vec<Value>,
    rule: Option<BackwardRule>,
    label: Option<String>,
}

/// Differentiable scalar: a shared handle to one node of the computation
/// graph.
///
/// Cloning a `Value` aliases the same node, it never copies it. Operand data
/// must stay unchanged between the forward and backward halves of a single
/// pass; optimizer writes through `set_data` belong between passes.
#[derive(Clone)]
pub struct Value {
    id: ValueId,
    node: Rc<RefCell<Node>>,
}

impl Value {
    pub fn new(data: ValueType) -> Self {
        Self {
            id: crate::next_id(),
            node: Rc::new(RefCell::new(Node {
                data,
                grad: 0.,
                operands: vec![],
                rule: None,
                label: None,
            })),
        }
    }

    fn from_op(data: ValueType, operands: Vec<Value>, rule: BackwardRule, label: &str) -> Self {
        Self {
            id: crate::next_id(),
            node: Rc::new(RefCell::new(Node {
                data,
                grad: 0.,
                operands,
                rule: Some(rule),
                label: Some(label.to_string()),
            })),
        }
    }

    pub fn id(&self) -> ValueId {
        self.id
    }

    pub fn data(&self) -> ValueType {
        self.node.borrow().data
    }

    pub fn set_data(&self, data: ValueType) {
        self.node.borrow_mut().data = data;
    }

    pub fn grad(&self) -> ValueType {
        self.node.borrow().grad
    }

    pub fn set_grad(&self, grad: ValueType) {
        self.node.borrow_mut().grad = grad;
    }

    pub fn reset_grad(&self) {
        self.set_grad(Default::default())
    }

    pub fn label(&self) -> Option<String> {
        self.node.borrow().label.clone()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        self.node.borrow_mut().label = Some(label.into());
    }

    fn accumulate_grad(&self, delta: ValueType) {
        self.node.borrow_mut().grad += delta;
    }

    pub fn tanh(&self) -> Value {
        Value::from_op(
            self.data().tanh(),
            vec![self.clone()],
            Self::tanh_backward,
            "tanh",
        )
    }

    /// Gradient at exactly 0 is 0 (sub-gradient convention).
    pub fn relu(&self) -> Value {
        let data = self.data();
        Value::from_op(
            if data < 0. { 0. } else { data },
            vec![self.clone()],
            Self::relu_backward,
            "ReLU",
        )
    }

    pub fn sigmoid(&self) -> Value {
        Value::from_op(
            1. / (1. + (-self.data()).exp()),
            vec![self.clone()],
            Self::sigmoid_backward,
            "sigmoid",
        )
    }

    pub fn exp(&self) -> Value {
        Value::from_op(
            self.data().exp(),
            vec![self.clone()],
            Self::exp_backward,
            "exp",
        )
    }

    /// Natural logarithm. A non-positive input yields a non-finite result
    /// rather than an error; callers add an epsilon where 0 is reachable.
    pub fn log(&self) -> Value {
        Value::from_op(
            self.data().ln(),
            vec![self.clone()],
            Self::log_backward,
            "log",
        )
    }

    pub fn pow(&self, exp: ValueType) -> Value {
        self.powv(Value::new(exp))
    }

    /// The exponent is treated as a constant; no gradient flows into it.
    pub fn powv(&self, exp: Value) -> Value {
        Value::from_op(
            self.data().powf(exp.data()),
            vec![self.clone(), exp],
            Self::pow_backward,
            "^",
        )
    }

    /// Computes the gradient of this value with respect to every node
    /// reachable through operand edges.
    ///
    /// Gradients accumulate: calling this twice without `reset_grad` in
    /// between doubles every gradient of an unchanged graph. The caller is
    /// responsible for zeroing gradients between optimizer iterations.
    pub fn backward(&self) {
        self.set_grad(1.0);
        let order = Self::reverse_topological(self.clone());
        trace!("backward pass over {} nodes", order.len());
        for value in order {
            let node = value.node.borrow();
            if let Some(rule) = node.rule {
                rule(&node.operands, node.data, node.grad);
            }
        }
    }

    /// Orders every reachable node so that each one appears after all of its
    /// consumers. Built iteratively with an explicit stack so graph depth is
    /// bounded by the heap, not the call stack.
    fn reverse_topological(root: Value) -> Vec<Value> {
        let mut order = vec![];
        let mut visited = HashSet::<ValueId>::new();
        let mut stack = vec![(root, false)];

        while let Some((value, operands_done)) = stack.pop() {
            if operands_done {
                order.push(value);
                continue;
            }
            if !visited.insert(value.id) {
                continue;
            }
            stack.push((value.clone(), true));
            for operand in value.node.borrow().operands.iter() {
                if !visited.contains(&operand.id) {
                    stack.push((operand.clone(), false));
                }
            }
        }

        order.reverse();
        order
    }

    fn add_backward(ops: &[Value], _out_data: ValueType, out_grad: ValueType) {
        ops[0].accumulate_grad(out_grad);
        ops[1].accumulate_grad(out_grad);
    }

    fn sub_backward(ops: &[Value], _out_data: ValueType, out_grad: ValueType) {
        ops[0].accumulate_grad(out_grad);
        ops[1].accumulate_grad(-out_grad);
    }

    fn mul_backward(ops: &[Value], _out_data: ValueType, out_grad: ValueType) {
        ops[0].accumulate_grad(ops[1].data() * out_grad);
        ops[1].accumulate_grad(ops[0].data() * out_grad);
    }

    fn div_backward(ops: &[Value], _out_data: ValueType, out_grad: ValueType) {
        let a = ops[0].data();
        let b = ops[1].data();
        ops[0].accumulate_grad(out_grad / b);
        ops[1].accumulate_grad(-a / (b * b) * out_grad);
    }

    fn neg_backward(ops: &[Value], _out_data: ValueType, out_grad: ValueType) {
        ops[0].accumulate_grad(-out_grad);
    }

    fn pow_backward(ops: &[Value], _out_data: ValueType, out_grad: ValueType) {
        let exp = ops[1].data();
        ops[0].accumulate_grad(exp * ops[0].data().powf(exp - 1.) * out_grad);
    }

    fn tanh_backward(ops: &[Value], out_data: ValueType, out_grad: ValueType) {
        ops[0].accumulate_grad((1. - out_data * out_data) * out_grad);
    }

    fn relu_backward(ops: &[Value], out_data: ValueType, out_grad: ValueType) {
        ops[0].accumulate_grad(if out_data > 0. { out_grad } else { 0. });
    }

    fn sigmoid_backward(ops: &[Value], out_data: ValueType, out_grad: ValueType) {
        ops[0].accumulate_grad(out_data * (1. - out_data) * out_grad);
    }

    fn exp_backward(ops: &[Value], out_data: ValueType, out_grad: ValueType) {
        ops[0].accumulate_grad(out_data * out_grad);
    }

    fn log_backward(ops: &[Value], _out_data: ValueType, out_grad: ValueType) {
        ops[0].accumulate_grad(out_grad / ops[0].data());
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        if Rc::strong_count(&self.node) != 1 {
            return;
        }
        // Drain operand chains iteratively; dropping a deep graph through
        // nested destructors would exhaust the stack.
        let mut queue = std::mem::take(&mut self.node.borrow_mut().operands);
        while let Some(value) = queue.pop() {
            if Rc::strong_count(&value.node) == 1 {
                queue.append(&mut value.node.borrow_mut().operands);
            }
        }
    }
}

impl PartialEq for Value {
    /// Compares forward values only; gradients and identity are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.data() == other.data()
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.data().partial_cmp(&other.data())
    }
}

impl std::iter::Sum for Value {
    fn sum<I: Iterator<Item = Value>>(iter: I) -> Value {
        iter.reduce(|acc, term| acc + term)
            .unwrap_or_else(|| Value::new(0.))
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("Value")
            .field("id", &self.id)
            .field("data", &self.data())
            .field("grad", &self.grad())
            .field("label", &self.label())
            .finish()
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let node = self.node.borrow();
        match node.operands.len() {
            0 => fmt.write_fmt(format_args!(
                "Value({:.06}, grad={:.06})",
                node.data, node.grad
            )),
            1 => fmt.write_fmt(format_args!(
                "{} [Value({:.06}, grad={:.06})]",
                node.label.as_deref().unwrap_or("?"),
                node.operands[0].data(),
                node.operands[0].grad(),
            )),
            2 => fmt.write_fmt(format_args!(
                "[Value({:.06}, grad={:.06})] {} [Value({:.06}, grad={:.06})]",
                node.operands[0].data(),
                node.operands[0].grad(),
                node.label.as_deref().unwrap_or("?"),
                node.operands[1].data(),
                node.operands[1].grad(),
            )),
            _ => unimplemented!(),
        }
    }
}

impl std::ops::Add for Value {
    type Output = Value;

    fn add(self, rhs: Value) -> Self::Output {
        Value::from_op(
            self.data() + rhs.data(),
            vec![self, rhs],
            Self::add_backward,
            "+",
        )
    }
}

impl std::ops::Add<Value> for ValueType {
    type Output = Value;

    fn add(self, rhs: Value) -> Self::Output {
        Value::new(self) + rhs
    }
}

impl std::ops::Add<ValueType> for Value {
    type Output = Value;

    fn add(self, rhs: ValueType) -> Self::Output {
        self + Value::new(rhs)
    }
}

impl std::ops::Sub for Value {
    type Output = Value;

    fn sub(self, rhs: Value) -> Self::Output {
        Value::from_op(
            self.data() - rhs.data(),
            vec![self, rhs],
            Self::sub_backward,
            "-",
        )
    }
}

impl std::ops::Sub<Value> for ValueType {
    type Output = Value;

    fn sub(self, rhs: Value) -> Self::Output {
        Value::new(self) - rhs
    }
}

impl std::ops::Sub<ValueType> for Value {
    type Output = Value;

    fn sub(self, rhs: ValueType) -> Self::Output {
        self - Value::new(rhs)
    }
}

impl std::ops::Mul for Value {
    type Output = Value;

    fn mul(self, rhs: Value) -> Self::Output {
        Value::from_op(
            self.data() * rhs.data(),
            vec![self, rhs],
            Self::mul_backward,
            "*",
        )
    }
}

impl std::ops::Mul<Value> for ValueType {
    type Output = Value;

    fn mul(self, rhs: Value) -> Self::Output {
        Value::new(self) * rhs
    }
}

impl std::ops::Mul<ValueType> for Value {
    type Output = Value;

    fn mul(self, rhs: ValueType) -> Self::Output {
        self * Value::new(rhs)
    }
}

impl std::ops::Div for Value {
    type Output = Value;

    fn div(self, rhs: Value) -> Self::Output {
        Value::from_op(
            self.data() / rhs.data(),
            vec![self, rhs],
            Self::div_backward,
            "/",
        )
    }
}

impl std::ops::Div<Value> for ValueType {
    type Output = Value;

    fn div(self, rhs: Value) -> Self::Output {
        Value::new(self) / rhs
    }
}

impl std::ops::Div<ValueType> for Value {
    type Output = Value;

    fn div(self, rhs: ValueType) -> Self::Output {
        self / Value::new(rhs)
    }
}

impl std::ops::Neg for Value {
    type Output = Value;

    fn neg(self) -> Self::Output {
        Value::from_op(-self.data(), vec![self], Self::neg_backward, "neg")
    }
}
