//! Typed access to a loaded test definition.
//!
//! A definition is the object a `.test` file evaluates to:
//! `{ name, length: [min, max], cases?, test? }`. Fields are read on demand
//! so the validator reports the first problem in its own check order.

use deno_core::v8;

use crate::core::metrics::LengthBounds;
use crate::core::types::Failure;
use crate::io::context::get;
use crate::io::engine::Artifact;
use crate::io::guard::{Guard, Stop};

pub struct Definition<'s> {
    object: v8::Local<'s, v8::Object>,
}

impl<'s> Definition<'s> {
    pub fn new(scope: &mut v8::HandleScope<'s>, artifact: &Artifact) -> Result<Self, Failure> {
        let value = v8::Local::new(scope, artifact.value());
        let object = v8::Local::<v8::Object>::try_from(value)
            .map_err(|_| Failure::invalid_test("definition must evaluate to an object"))?;
        Ok(Self { object })
    }

    pub fn object(&self) -> v8::Local<'s, v8::Object> {
        self.object
    }

    /// Export name of the function under test.
    pub fn name(&self, scope: &mut v8::HandleScope<'s>, guard: &Guard) -> Result<String, Stop> {
        let name = self.field(scope, guard, "name")?;
        if !name.is_string() {
            return Err(Failure::invalid_test("name must be a string").into());
        }
        Ok(name.to_rust_string_lossy(scope))
    }

    /// `length: [min, max]`.
    pub fn bounds(
        &self,
        scope: &mut v8::HandleScope<'s>,
        guard: &Guard,
    ) -> Result<LengthBounds, Stop> {
        let invalid = || Failure::invalid_test("length must be [min, max] numbers");
        let range = v8::Local::<v8::Array>::try_from(self.field(scope, guard, "length")?)
            .map_err(|_| invalid())?;
        if range.length() < 2 {
            return Err(invalid().into());
        }
        let (min, max) = guard.attempt(scope, |scope| {
            Some((range.get_index(scope, 0)?, range.get_index(scope, 1)?))
        })?;
        let min = number(scope, min).ok_or_else(invalid)?;
        let max = number(scope, max).ok_or_else(invalid)?;
        Ok(LengthBounds::new(min, max))
    }

    /// Call cases, if any. Each entry must itself be an array.
    pub fn cases(
        &self,
        scope: &mut v8::HandleScope<'s>,
        guard: &Guard,
    ) -> Result<Option<v8::Local<'s, v8::Array>>, Stop> {
        let value = self.field(scope, guard, "cases")?;
        if value.is_null_or_undefined() {
            return Ok(None);
        }
        v8::Local::<v8::Array>::try_from(value)
            .map(Some)
            .map_err(|_| Failure::invalid_test("cases must be an array").into())
    }

    /// Custom assertion hook, if any.
    pub fn hook(
        &self,
        scope: &mut v8::HandleScope<'s>,
        guard: &Guard,
    ) -> Result<Option<v8::Local<'s, v8::Function>>, Stop> {
        let value = self.field(scope, guard, "test")?;
        if value.is_null_or_undefined() {
            return Ok(None);
        }
        v8::Local::<v8::Function>::try_from(value)
            .map(Some)
            .map_err(|_| Failure::invalid_test("test must be a function").into())
    }

    fn field(
        &self,
        scope: &mut v8::HandleScope<'s>,
        guard: &Guard,
        name: &str,
    ) -> Result<v8::Local<'s, v8::Value>, Stop> {
        let object = self.object;
        guard.attempt(scope, |scope| get(scope, object, name))
    }
}

fn number(scope: &mut v8::HandleScope, value: v8::Local<v8::Value>) -> Option<f64> {
    if !value.is_number() {
        return None;
    }
    value.number_value(scope)
}

/// Split a case entry into call arguments and the trailing expected value.
pub fn split_case<'s>(
    scope: &mut v8::HandleScope<'s>,
    guard: &Guard,
    entry: v8::Local<'s, v8::Array>,
) -> Result<(Vec<v8::Local<'s, v8::Value>>, v8::Local<'s, v8::Value>), Stop> {
    let mut values = guard.attempt(scope, |scope| {
        let mut values = Vec::with_capacity(entry.length() as usize);
        for index in 0..entry.length() {
            values.push(entry.get_index(scope, index)?);
        }
        Some(values)
    })?;
    let expected = match values.pop() {
        Some(expected) => expected,
        None => v8::undefined(scope).into(),
    };
    Ok((values, expected))
}
