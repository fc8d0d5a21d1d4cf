//! Validator values and their builders.
//!
//! A [`Validator`] is one of six shapes. Each shape has a builder type that
//! records constraints; [`Constrain`] adds the constraints every shape
//! shares. Builders consume `self`, so a chain reads left to right:
//!
//! ```
//! use rpcgen_validate::{Constrain, Validator};
//! use serde_json::json;
//!
//! let name = Validator::string().min_length(2).required();
//! assert!(name.validate(Some(&json!("Ada"))).is_ok());
//! assert_eq!(
//!     name.validate(Some(&json!(""))).unwrap_err().message,
//!     "String must be at least 2 characters long"
//! );
//! ```
//!
//! Evaluation order is fixed regardless of the order constraints were added:
//! presence, type, `equals`/`one_of`, then the shape's own checks, then
//! recursion into elements or properties. The first failure wins.

use crate::error::{Invalid, Outcome};
use crate::formats;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub(crate) const REQUIRED_MESSAGE: &str = "Field is required";

/// The JSON shape a validator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    String,
    Number,
    Int,
    Float,
    Boolean,
    Array,
    Object,
}

impl TypeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Boolean => "boolean",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape-specific check kinds, ordered by `rank`.
pub trait CheckKind: Clone + fmt::Debug + Send + Sync {
    fn rank(&self) -> u8;
}

/// For shapes with no checks of their own.
#[derive(Clone, Debug)]
pub enum NoCheck {}

impl CheckKind for NoCheck {
    fn rank(&self) -> u8 {
        match *self {}
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Check<K> {
    Required,
    Equals(Value),
    OneOf(Vec<Value>),
    Specific(K),
}

impl<K: CheckKind> Check<K> {
    fn rank(&self) -> u16 {
        match self {
            Check::Required => 0,
            Check::Equals(_) => 1,
            Check::OneOf(_) => 2,
            Check::Specific(kind) => 16 + u16::from(kind.rank()),
        }
    }
}

#[derive(Clone, Debug)]
struct Checked<K> {
    check: Check<K>,
    message: Option<String>,
}

/// The constraints recorded on one validator.
#[derive(Clone, Debug)]
pub struct Checks<K> {
    items: Vec<Checked<K>>,
    /// Index of the most recently set constraint, the target of `message`.
    last: Option<usize>,
}

impl<K> Default for Checks<K> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            last: None,
        }
    }
}

impl<K: CheckKind> Checks<K> {
    /// Setting a constraint that is already present replaces it.
    pub(crate) fn set(&mut self, check: Check<K>) {
        let rank = check.rank();
        let entry = Checked {
            check,
            message: None,
        };
        match self.items.iter().position(|c| c.check.rank() == rank) {
            Some(i) => {
                self.items[i] = entry;
                self.last = Some(i);
            }
            None => {
                self.items.push(entry);
                self.last = Some(self.items.len() - 1);
            }
        }
    }

    pub(crate) fn set_message(&mut self, message: String) {
        if let Some(i) = self.last {
            self.items[i].message = Some(message);
        }
    }

    pub fn is_required(&self) -> bool {
        self.items.iter().any(|c| matches!(c.check, Check::Required))
    }

    /// Outcome for an absent (or null) value.
    fn absent(&self) -> Result<(), Invalid> {
        match self
            .items
            .iter()
            .find(|c| matches!(c.check, Check::Required))
        {
            Some(c) => Err(Invalid::new(
                c.message.as_deref().unwrap_or(REQUIRED_MESSAGE),
            )),
            None => Ok(()),
        }
    }

    /// Run `equals`, `one_of` and the shape's checks against a present,
    /// correctly typed value.
    fn run(
        &self,
        value: &Value,
        specific: impl Fn(&K) -> Result<(), String>,
    ) -> Result<(), Invalid> {
        let mut ordered: Vec<&Checked<K>> = self.items.iter().collect();
        ordered.sort_by_key(|c| c.check.rank());
        for checked in ordered {
            let outcome = match &checked.check {
                Check::Required => Ok(()),
                Check::Equals(expected) => {
                    if json_eq(value, expected) {
                        Ok(())
                    } else {
                        Err(format!("Value must equal {expected}"))
                    }
                }
                Check::OneOf(allowed) => {
                    if allowed.iter().any(|a| json_eq(value, a)) {
                        Ok(())
                    } else {
                        let listed: Vec<String> = allowed.iter().map(Value::to_string).collect();
                        Err(format!("Value must be one of: {}", listed.join(", ")))
                    }
                }
                Check::Specific(kind) => specific(kind),
            };
            if let Err(default) = outcome {
                return Err(Invalid::new(checked.message.clone().unwrap_or(default)));
            }
        }
        Ok(())
    }
}

/// Numbers compare by value, so `5` equals `5.0`.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Constraints shared by every shape.
pub trait Constrain: Sized {
    type Kind: CheckKind;

    #[doc(hidden)]
    fn checks_mut(&mut self) -> &mut Checks<Self::Kind>;

    /// Reject absent and null values.
    fn required(mut self) -> Self {
        self.checks_mut().set(Check::Required);
        self
    }

    fn equals(mut self, value: impl Into<Value>) -> Self {
        self.checks_mut().set(Check::Equals(value.into()));
        self
    }

    fn one_of<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.checks_mut().set(Check::OneOf(values));
        self
    }

    /// Replace the default failure message of the constraint added last.
    fn message(mut self, message: impl Into<String>) -> Self {
        self.checks_mut().set_message(message.into());
        self
    }
}

macro_rules! constrain_impl {
    ($ty:ty, $kind:ty) => {
        impl Constrain for $ty {
            type Kind = $kind;

            fn checks_mut(&mut self) -> &mut Checks<$kind> {
                &mut self.checks
            }
        }
    };
}

// ---------------------------------------------------------------------------
// string
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub enum StringCheck {
    Regex(Regex),
    Contains(String),
    Length(usize),
    MinLength(usize),
    MaxLength(usize),
    Email,
    Iso8601,
    Uuid,
    Json,
    Lowercase,
    Uppercase,
}

impl CheckKind for StringCheck {
    fn rank(&self) -> u8 {
        match self {
            StringCheck::Regex(_) => 0,
            StringCheck::Contains(_) => 1,
            StringCheck::Length(_) => 2,
            StringCheck::MinLength(_) => 3,
            StringCheck::MaxLength(_) => 4,
            StringCheck::Email => 5,
            StringCheck::Iso8601 => 6,
            StringCheck::Uuid => 7,
            StringCheck::Json => 8,
            StringCheck::Lowercase => 9,
            StringCheck::Uppercase => 10,
        }
    }
}

impl StringCheck {
    fn apply(&self, s: &str) -> Result<(), String> {
        let ok = match self {
            StringCheck::Regex(re) => re.is_match(s),
            StringCheck::Contains(needle) => s.contains(needle.as_str()),
            StringCheck::Length(n) => s.chars().count() == *n,
            StringCheck::MinLength(n) => s.chars().count() >= *n,
            StringCheck::MaxLength(n) => s.chars().count() <= *n,
            StringCheck::Email => formats::is_email(s),
            StringCheck::Iso8601 => formats::is_iso8601(s),
            StringCheck::Uuid => formats::is_uuid(s),
            StringCheck::Json => formats::is_json(s),
            StringCheck::Lowercase => s == s.to_lowercase(),
            StringCheck::Uppercase => s == s.to_uppercase(),
        };
        if ok {
            return Ok(());
        }
        Err(match self {
            StringCheck::Regex(_) => "String does not match the required pattern".into(),
            StringCheck::Contains(needle) => format!("String must contain \"{needle}\""),
            StringCheck::Length(n) => format!("String must be exactly {n} characters long"),
            StringCheck::MinLength(n) => format!("String must be at least {n} characters long"),
            StringCheck::MaxLength(n) => format!("String must be at most {n} characters long"),
            StringCheck::Email => "Invalid email format".into(),
            StringCheck::Iso8601 => "Invalid ISO 8601 date-time format".into(),
            StringCheck::Uuid => "Invalid UUID format".into(),
            StringCheck::Json => "Invalid JSON string".into(),
            StringCheck::Lowercase => "String must be lowercase".into(),
            StringCheck::Uppercase => "String must be uppercase".into(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct StringValidator {
    checks: Checks<StringCheck>,
}

constrain_impl!(StringValidator, StringCheck);

impl StringValidator {
    fn with(mut self, check: StringCheck) -> Self {
        self.checks.set(Check::Specific(check));
        self
    }

    pub fn regex(self, pattern: Regex) -> Self {
        self.with(StringCheck::Regex(pattern))
    }

    pub fn contains(self, needle: impl Into<String>) -> Self {
        self.with(StringCheck::Contains(needle.into()))
    }

    /// Exact length in characters.
    pub fn length(self, n: usize) -> Self {
        self.with(StringCheck::Length(n))
    }

    pub fn min_length(self, n: usize) -> Self {
        self.with(StringCheck::MinLength(n))
    }

    pub fn max_length(self, n: usize) -> Self {
        self.with(StringCheck::MaxLength(n))
    }

    pub fn email(self) -> Self {
        self.with(StringCheck::Email)
    }

    pub fn iso8601(self) -> Self {
        self.with(StringCheck::Iso8601)
    }

    pub fn uuid(self) -> Self {
        self.with(StringCheck::Uuid)
    }

    /// The string must itself parse as JSON.
    pub fn json(self) -> Self {
        self.with(StringCheck::Json)
    }

    pub fn lowercase(self) -> Self {
        self.with(StringCheck::Lowercase)
    }

    pub fn uppercase(self) -> Self {
        self.with(StringCheck::Uppercase)
    }

    pub fn validate(&self, value: Option<&Value>) -> Result<(), Invalid> {
        let Some(value) = present(value) else {
            return self.checks.absent();
        };
        let Value::String(s) = value else {
            return Err(Invalid::type_mismatch(TypeTag::String));
        };
        self.checks.run(value, |check| check.apply(s))
    }
}

// ---------------------------------------------------------------------------
// number, int, float
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub enum NumberCheck {
    Min(f64),
    Max(f64),
}

impl CheckKind for NumberCheck {
    fn rank(&self) -> u8 {
        match self {
            NumberCheck::Min(_) => 0,
            NumberCheck::Max(_) => 1,
        }
    }
}

impl NumberCheck {
    fn apply(&self, n: f64) -> Result<(), String> {
        match *self {
            NumberCheck::Min(min) if n < min => Err(format!("Value is below the minimum of {min}")),
            NumberCheck::Max(max) if n > max => Err(format!("Value exceeds the maximum of {max}")),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NumberValidator {
    tag: TypeTag,
    checks: Checks<NumberCheck>,
}

constrain_impl!(NumberValidator, NumberCheck);

impl NumberValidator {
    fn new(tag: TypeTag) -> Self {
        Self {
            tag,
            checks: Checks::default(),
        }
    }

    /// `number`, `int` or `float`.
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Inclusive lower bound.
    pub fn min(mut self, min: f64) -> Self {
        self.checks.set(Check::Specific(NumberCheck::Min(min)));
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.checks.set(Check::Specific(NumberCheck::Max(max)));
        self
    }

    pub fn validate(&self, value: Option<&Value>) -> Result<(), Invalid> {
        let Some(value) = present(value) else {
            return self.checks.absent();
        };
        let Some(n) = value.as_f64() else {
            return Err(Invalid::type_mismatch(self.tag));
        };
        // 5.0 is an int; 5.5 is not.
        if self.tag == TypeTag::Int && !(n.is_finite() && n.fract() == 0.0) {
            return Err(Invalid::type_mismatch(TypeTag::Int));
        }
        self.checks.run(value, |check| check.apply(n))
    }
}

// ---------------------------------------------------------------------------
// boolean
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct BooleanValidator {
    checks: Checks<NoCheck>,
}

constrain_impl!(BooleanValidator, NoCheck);

impl BooleanValidator {
    pub fn validate(&self, value: Option<&Value>) -> Result<(), Invalid> {
        let Some(value) = present(value) else {
            return self.checks.absent();
        };
        if !value.is_boolean() {
            return Err(Invalid::type_mismatch(TypeTag::Boolean));
        }
        self.checks.run(value, |never| match *never {})
    }
}

// ---------------------------------------------------------------------------
// array
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ArrayValidator {
    element: Box<Validator>,
    checks: Checks<NoCheck>,
}

constrain_impl!(ArrayValidator, NoCheck);

impl ArrayValidator {
    pub fn element(&self) -> &Validator {
        &self.element
    }

    /// Every element is validated; the first failure is returned unchanged.
    pub fn validate(&self, value: Option<&Value>) -> Result<(), Invalid> {
        let Some(value) = present(value) else {
            return self.checks.absent();
        };
        let Value::Array(items) = value else {
            return Err(Invalid::type_mismatch(TypeTag::Array));
        };
        self.checks.run(value, |never| match *never {})?;
        items
            .iter()
            .try_for_each(|item| self.element.validate(Some(item)))
    }
}

// ---------------------------------------------------------------------------
// object
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct ObjectValidator {
    fields: Vec<(String, Validator)>,
    checks: Checks<NoCheck>,
}

constrain_impl!(ObjectValidator, NoCheck);

impl ObjectValidator {
    /// Declare a property. Declaring the same name again replaces it.
    pub fn field(mut self, name: impl Into<String>, validator: impl Into<Validator>) -> Self {
        let name = name.into();
        let validator = validator.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = validator,
            None => self.fields.push((name, validator)),
        }
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Validator)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Declared properties are validated in declaration order; undeclared
    /// properties are ignored.
    pub fn validate(&self, value: Option<&Value>) -> Result<(), Invalid> {
        let Some(value) = present(value) else {
            return self.checks.absent();
        };
        let Value::Object(map) = value else {
            return Err(Invalid::type_mismatch(TypeTag::Object));
        };
        self.checks.run(value, |never| match *never {})?;
        self.fields
            .iter()
            .try_for_each(|(name, validator)| validator.validate(map.get(name)))
    }
}

// ---------------------------------------------------------------------------
// lazy
// ---------------------------------------------------------------------------

type Resolve = dyn Fn() -> Option<Arc<Validator>> + Send + Sync;

/// Defers to a validator produced on each use, which is what lets
/// validators refer to themselves.
#[derive(Clone)]
pub struct LazyValidator {
    resolve: Arc<Resolve>,
    checks: Checks<NoCheck>,
}

constrain_impl!(LazyValidator, NoCheck);

impl fmt::Debug for LazyValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyValidator")
            .field("checks", &self.checks)
            .finish_non_exhaustive()
    }
}

impl LazyValidator {
    /// A lazy validator whose target may be missing at validation time.
    pub fn fallible(resolve: impl Fn() -> Option<Arc<Validator>> + Send + Sync + 'static) -> Self {
        Self {
            resolve: Arc::new(resolve),
            checks: Checks::default(),
        }
    }

    /// The current target, if it can be found.
    pub fn resolve(&self) -> Option<Arc<Validator>> {
        (self.resolve)()
    }

    pub fn validate(&self, value: Option<&Value>) -> Result<(), Invalid> {
        let Some(value) = present(value) else {
            return self.checks.absent();
        };
        self.checks.run(value, |never| match *never {})?;
        match self.resolve() {
            Some(target) => target.validate(Some(value)),
            None => Err(Invalid::new("Referenced schema is not defined")),
        }
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub enum Validator {
    String(StringValidator),
    Number(NumberValidator),
    Boolean(BooleanValidator),
    Array(ArrayValidator),
    Object(ObjectValidator),
    Lazy(LazyValidator),
}

macro_rules! dispatch {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            Validator::String($v) => $body,
            Validator::Number($v) => $body,
            Validator::Boolean($v) => $body,
            Validator::Array($v) => $body,
            Validator::Object($v) => $body,
            Validator::Lazy($v) => $body,
        }
    };
}

macro_rules! rewrap {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            Validator::String($v) => Validator::String($body),
            Validator::Number($v) => Validator::Number($body),
            Validator::Boolean($v) => Validator::Boolean($body),
            Validator::Array($v) => Validator::Array($body),
            Validator::Object($v) => Validator::Object($body),
            Validator::Lazy($v) => Validator::Lazy($body),
        }
    };
}

impl Validator {
    pub fn string() -> StringValidator {
        StringValidator::default()
    }

    /// Any JSON number.
    pub fn number() -> NumberValidator {
        NumberValidator::new(TypeTag::Number)
    }

    /// A number with no fractional part.
    pub fn int() -> NumberValidator {
        NumberValidator::new(TypeTag::Int)
    }

    pub fn float() -> NumberValidator {
        NumberValidator::new(TypeTag::Float)
    }

    pub fn boolean() -> BooleanValidator {
        BooleanValidator::default()
    }

    pub fn array(element: impl Into<Validator>) -> ArrayValidator {
        ArrayValidator {
            element: Box::new(element.into()),
            checks: Checks::default(),
        }
    }

    pub fn object() -> ObjectValidator {
        ObjectValidator::default()
    }

    pub fn lazy(thunk: impl Fn() -> Validator + Send + Sync + 'static) -> LazyValidator {
        LazyValidator::fallible(move || Some(Arc::new(thunk())))
    }

    /// The accepted shape. Lazy validators have none of their own.
    pub fn tag(&self) -> Option<TypeTag> {
        match self {
            Validator::String(_) => Some(TypeTag::String),
            Validator::Number(n) => Some(n.tag()),
            Validator::Boolean(_) => Some(TypeTag::Boolean),
            Validator::Array(_) => Some(TypeTag::Array),
            Validator::Object(_) => Some(TypeTag::Object),
            Validator::Lazy(_) => None,
        }
    }

    /// Validate a possibly absent value. `None` and JSON `null` are both
    /// treated as absent.
    pub fn validate(&self, value: Option<&Value>) -> Result<(), Invalid> {
        dispatch!(self, v => v.validate(value))
    }

    /// [`validate`](Self::validate) folded into a serializable outcome.
    pub fn check(&self, value: Option<&Value>) -> Outcome {
        self.validate(value).into()
    }

    pub fn is_required(&self) -> bool {
        dispatch!(self, v => v.checks.is_required())
    }

    pub fn required(self) -> Self {
        rewrap!(self, v => v.required())
    }

    pub fn equals(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        rewrap!(self, v => v.equals(value))
    }

    pub fn one_of(self, values: Vec<Value>) -> Self {
        rewrap!(self, v => v.one_of(values))
    }

    pub fn message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        rewrap!(self, v => v.message(message))
    }
}

macro_rules! into_validator {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Validator {
            fn from(value: $ty) -> Self {
                Validator::$variant(value)
            }
        }
    };
}

into_validator!(StringValidator, String);
into_validator!(NumberValidator, Number);
into_validator!(BooleanValidator, Boolean);
into_validator!(ArrayValidator, Array);
into_validator!(ObjectValidator, Object);
into_validator!(LazyValidator, Lazy);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(v: &Validator, value: Value) -> String {
        v.validate(Some(&value)).unwrap_err().message
    }

    #[test]
    fn required_string() {
        let v: Validator = Validator::string().required().into();
        assert_eq!(v.validate(None).unwrap_err().message, "Field is required");
        assert_eq!(message(&v, Value::Null), "Field is required");
        assert!(v.validate(Some(&json!(""))).is_ok());
    }

    #[test]
    fn absent_optional_values_pass() {
        let v: Validator = Validator::int().min(3.0).into();
        assert!(v.validate(None).is_ok());
        assert!(v.validate(Some(&Value::Null)).is_ok());
    }

    #[test]
    fn int_bounds() {
        let v: Validator = Validator::int().min(0.0).max(10.0).into();
        assert!(v.validate(Some(&json!(5))).is_ok());
        assert!(v.validate(Some(&json!(5.0))).is_ok());
        assert!(message(&v, json!(11)).contains("maximum"));
        assert_eq!(message(&v, json!(-1)), "Value is below the minimum of 0");
        assert_eq!(message(&v, json!(5.5)), "Invalid type, expected int");
        assert_eq!(message(&v, json!("5")), "Invalid type, expected int");
    }

    #[test]
    fn float_accepts_integers() {
        let v: Validator = Validator::float().into();
        assert!(v.validate(Some(&json!(3))).is_ok());
        assert_eq!(message(&v, json!(true)), "Invalid type, expected float");
    }

    #[test]
    fn type_check_precedes_constraints() {
        let v: Validator = Validator::string().min_length(3).email().into();
        assert_eq!(message(&v, json!(42)), "Invalid type, expected string");
    }

    #[test]
    fn evaluation_order_is_fixed() {
        // Declared email first, but min length is checked first.
        let v: Validator = Validator::string().email().min_length(10).into();
        assert_eq!(message(&v, json!("a@b")), "String must be at least 10 characters long");
    }

    #[test]
    fn custom_messages_attach_to_the_last_constraint() {
        let v: Validator = Validator::string()
            .required()
            .message("name please")
            .max_length(3)
            .message("too long")
            .into();
        assert_eq!(v.validate(None).unwrap_err().message, "name please");
        assert_eq!(message(&v, json!("abcd")), "too long");
    }

    #[test]
    fn resetting_a_constraint_replaces_it() {
        let v: Validator = Validator::string().max_length(2).max_length(5).into();
        assert!(v.validate(Some(&json!("abcd"))).is_ok());
    }

    #[test]
    fn string_checks() {
        let re = Regex::new("^[a-z]+-[0-9]+$").unwrap();
        let cases: Vec<(Validator, Value, Option<&str>)> = vec![
            (Validator::string().regex(re.clone()).into(), json!("abc-1"), None),
            (
                Validator::string().regex(re).into(),
                json!("ABC"),
                Some("String does not match the required pattern"),
            ),
            (Validator::string().contains("@").into(), json!("a@b"), None),
            (
                Validator::string().contains("@").into(),
                json!("ab"),
                Some("String must contain \"@\""),
            ),
            (Validator::string().length(2).into(), json!("é!"), None),
            (
                Validator::string().length(2).into(),
                json!("abc"),
                Some("String must be exactly 2 characters long"),
            ),
            (
                Validator::string().max_length(1).into(),
                json!("ab"),
                Some("String must be at most 1 characters long"),
            ),
            (Validator::string().email().into(), json!("nope"), Some("Invalid email format")),
            (
                Validator::string().iso8601().into(),
                json!("2024-01-01"),
                Some("Invalid ISO 8601 date-time format"),
            ),
            (Validator::string().uuid().into(), json!("1234"), Some("Invalid UUID format")),
            (Validator::string().json().into(), json!("[1,"), Some("Invalid JSON string")),
            (Validator::string().json().into(), json!("[1]"), None),
            (
                Validator::string().lowercase().into(),
                json!("aB"),
                Some("String must be lowercase"),
            ),
            (
                Validator::string().uppercase().into(),
                json!("aB"),
                Some("String must be uppercase"),
            ),
            (Validator::string().uppercase().into(), json!("AB-1"), None),
        ];
        for (validator, value, expected) in cases {
            let got = validator.validate(Some(&value)).err().map(|e| e.message);
            assert_eq!(got.as_deref(), expected, "value {value}");
        }
    }

    #[test]
    fn equals_and_one_of() {
        let v: Validator = Validator::string().equals("admin").into();
        assert!(v.validate(Some(&json!("admin"))).is_ok());
        assert_eq!(message(&v, json!("guest")), "Value must equal \"admin\"");

        let v: Validator = Validator::int().one_of([1, 2, 3]).into();
        assert!(v.validate(Some(&json!(2.0))).is_ok());
        assert_eq!(message(&v, json!(4)), "Value must be one of: 1, 2, 3");
    }

    #[test]
    fn array_elements_surface_first_failure() {
        let v: Validator = Validator::array(Validator::int().max(3.0)).into();
        assert!(v.validate(Some(&json!([1, 2, 3]))).is_ok());
        assert!(message(&v, json!([1, 9, "x"])).contains("maximum"));
        assert_eq!(message(&v, json!({})), "Invalid type, expected array");
    }

    #[test]
    fn objects_check_declared_fields_only() {
        let v: Validator = Validator::object()
            .field("id", Validator::string().required())
            .field("age", Validator::int())
            .into();
        assert!(v.validate(Some(&json!({ "id": "x", "extra": [] }))).is_ok());
        assert_eq!(message(&v, json!({ "age": 3 })), "Field is required");
        assert_eq!(message(&v, json!({ "id": "x", "age": "3" })), "Invalid type, expected int");
        assert_eq!(message(&v, json!([])), "Invalid type, expected object");
    }

    fn tree() -> Validator {
        Validator::object()
            .field("name", Validator::string().required())
            .field("children", Validator::array(Validator::lazy(tree)))
            .into()
    }

    #[test]
    fn lazy_recursion_reaches_leaf_errors() {
        let v = tree();
        let ok = json!({
            "name": "a",
            "children": [{ "name": "b", "children": [{ "name": "c", "children": [] }] }]
        });
        assert!(v.validate(Some(&ok)).is_ok());

        let bad = json!({
            "name": "a",
            "children": [{ "name": "b", "children": [{ "children": [] }] }]
        });
        assert_eq!(message(&v, bad), "Field is required");
    }

    #[test]
    fn unresolved_lazy_fails() {
        let v: Validator = LazyValidator::fallible(|| None).into();
        assert!(v.validate(None).is_ok());
        assert_eq!(message(&v, json!({})), "Referenced schema is not defined");
    }

    #[test]
    fn dynamic_modifiers() {
        let v = Validator::from(Validator::boolean()).required().message("say yes or no");
        assert!(v.is_required());
        assert_eq!(v.validate(None).unwrap_err().message, "say yes or no");
        assert_eq!(v.tag(), Some(TypeTag::Boolean));
    }
}
