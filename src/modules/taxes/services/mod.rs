pub mod amount_calculator;

pub use amount_calculator::{AmountCalculator, CalculatorProfile};
