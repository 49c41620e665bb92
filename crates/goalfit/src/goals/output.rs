//! Output coverage goals: "method M returned a value in category C".

use super::{normalize, CoverageGoal, GoalFactory};
use crate::execution::{ExecutionResult, ObservedValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared return type of a method, coarse enough to pick value categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    /// No return value
    Void,
    /// Boolean
    Boolean,
    /// Any integral type
    Integral,
    /// Any floating point type
    Floating,
    /// Character
    Char,
    /// String
    String,
    /// Array
    Array,
    /// Any other reference type
    Object,
}

impl ReturnType {
    /// Value categories that become goals for this return type
    #[must_use]
    pub const fn categories(self) -> &'static [OutputValue] {
        match self {
            Self::Void => &[],
            Self::Boolean => &[OutputValue::True, OutputValue::False],
            Self::Integral | Self::Floating => {
                &[OutputValue::Negative, OutputValue::Zero, OutputValue::Positive]
            }
            Self::Char => &[
                OutputValue::Alphabetic,
                OutputValue::Digit,
                OutputValue::OtherChar,
            ],
            Self::String | Self::Array => {
                &[OutputValue::Null, OutputValue::Empty, OutputValue::NonEmpty]
            }
            Self::Object => &[OutputValue::Null, OutputValue::NonNull],
        }
    }
}

/// A category of returned values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputValue {
    /// Boolean `true`
    True,
    /// Boolean `false`
    False,
    /// Number below zero
    Negative,
    /// Number equal to zero
    Zero,
    /// Number above zero
    Positive,
    /// Alphabetic character
    Alphabetic,
    /// Decimal digit character
    Digit,
    /// Any other character
    OtherChar,
    /// Null reference
    Null,
    /// Empty string or array
    Empty,
    /// Non-empty string or array
    NonEmpty,
    /// Non-null reference
    NonNull,
}

impl OutputValue {
    /// Raw distance of one observed value from this category
    ///
    /// `None` when the value cannot say anything about the category
    /// (a mismatched kind, or NaN).
    #[must_use]
    pub fn raw_distance(self, value: &ObservedValue) -> Option<f64> {
        match (self, value) {
            (Self::True, ObservedValue::Bool(b)) => Some(if *b { 0.0 } else { 1.0 }),
            (Self::False, ObservedValue::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),

            (Self::Negative | Self::Zero | Self::Positive, ObservedValue::Int(i)) => {
                Some(numeric_distance(self, *i as f64))
            }
            (Self::Negative | Self::Zero | Self::Positive, ObservedValue::Float(f)) => {
                if f.is_nan() {
                    None
                } else {
                    Some(numeric_distance(self, *f))
                }
            }

            (Self::Alphabetic | Self::Digit | Self::OtherChar, ObservedValue::Char(c)) => {
                Some(char_distance(self, *c))
            }

            (Self::Null, ObservedValue::Null) => Some(0.0),
            (Self::Null, ObservedValue::Str(_) | ObservedValue::Array(_) | ObservedValue::Object) => {
                Some(1.0)
            }
            (Self::NonNull, ObservedValue::Null) => Some(1.0),
            (Self::NonNull, ObservedValue::Str(_) | ObservedValue::Array(_) | ObservedValue::Object) => {
                Some(0.0)
            }

            (Self::Empty, ObservedValue::Null) => Some(1.0),
            (Self::Empty, ObservedValue::Str(s)) => Some(s.chars().count() as f64),
            (Self::Empty, ObservedValue::Array(len)) => Some(*len as f64),
            (Self::NonEmpty, ObservedValue::Null) => Some(2.0),
            (Self::NonEmpty, ObservedValue::Str(s)) => Some(if s.is_empty() { 1.0 } else { 0.0 }),
            (Self::NonEmpty, ObservedValue::Array(len)) => Some(if *len == 0 { 1.0 } else { 0.0 }),

            _ => None,
        }
    }
}

fn numeric_distance(category: OutputValue, v: f64) -> f64 {
    match category {
        OutputValue::Negative if v < 0.0 => 0.0,
        OutputValue::Negative => v + 1.0,
        OutputValue::Positive if v > 0.0 => 0.0,
        OutputValue::Positive => v.abs() + 1.0,
        _ => v.abs(),
    }
}

fn char_distance(category: OutputValue, c: char) -> f64 {
    let code = f64::from(u32::from(c));
    let range = |lo: char, hi: char| {
        let (lo, hi) = (f64::from(u32::from(lo)), f64::from(u32::from(hi)));
        if code < lo {
            lo - code
        } else if code > hi {
            code - hi
        } else {
            0.0
        }
    };
    match category {
        OutputValue::Digit => range('0', '9'),
        OutputValue::Alphabetic if c.is_alphabetic() => 0.0,
        OutputValue::Alphabetic => range('A', 'Z').min(range('a', 'z')),
        _ if c.is_alphabetic() || c.is_ascii_digit() => 1.0,
        _ => 0.0,
    }
}

/// Goal: `class_name.method_signature` returned a value in `value`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputGoal {
    class_name: String,
    method_signature: String,
    return_type: ReturnType,
    value: OutputValue,
}

impl OutputGoal {
    /// Create an output goal
    #[must_use]
    pub fn new(class_name: &str, method_signature: &str, return_type: ReturnType, value: OutputValue) -> Self {
        Self {
            class_name: class_name.to_string(),
            method_signature: method_signature.to_string(),
            return_type,
            value,
        }
    }

    /// Class of the observed method
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Signature of the observed method
    #[must_use]
    pub fn method_signature(&self) -> &str {
        &self.method_signature
    }

    /// Declared return type
    #[must_use]
    pub const fn return_type(&self) -> ReturnType {
        self.return_type
    }

    /// Targeted value category
    #[must_use]
    pub const fn value(&self) -> OutputValue {
        self.value
    }
}

impl CoverageGoal for OutputGoal {
    fn distance(&self, result: &ExecutionResult) -> f64 {
        result
            .trace
            .return_values(&self.class_name, &self.method_signature)
            .iter()
            .filter_map(|v| self.value.raw_distance(v))
            .map(normalize)
            .fold(1.0, f64::min)
    }
}

impl fmt::Display for OutputGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}:{:?}",
            self.class_name, self.method_signature, self.value
        )
    }
}

/// A method of the program under test, as seen by static analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Owning class
    pub class_name: String,
    /// Method signature
    pub method_signature: String,
    /// Declared return type
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    /// Create a method descriptor
    #[must_use]
    pub fn new(class_name: &str, method_signature: &str, return_type: ReturnType) -> Self {
        Self {
            class_name: class_name.to_string(),
            method_signature: method_signature.to_string(),
            return_type,
        }
    }
}

/// Enumerates one output goal per method and value category
#[derive(Debug, Clone, Default)]
pub struct OutputGoalFactory {
    methods: Vec<MethodDescriptor>,
}

impl OutputGoalFactory {
    /// Create a factory over the given methods
    #[must_use]
    pub fn new(methods: Vec<MethodDescriptor>) -> Self {
        Self { methods }
    }

    /// Load method descriptors from a JSON array
    pub fn from_json(json: &str) -> crate::result::GoalfitResult<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

impl GoalFactory for OutputGoalFactory {
    type Goal = OutputGoal;

    fn criterion(&self) -> &'static str {
        "output"
    }

    fn coverage_goals(&self) -> Vec<OutputGoal> {
        self.methods
            .iter()
            .flat_map(|m| {
                m.return_type.categories().iter().map(move |value| {
                    OutputGoal::new(&m.class_name, &m.method_signature, m.return_type, *value)
                })
            })
            .collect()
    }
}
