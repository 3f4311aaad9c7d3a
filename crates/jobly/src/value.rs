//! Bindable scalar values.
//!
//! Filter descriptors and partial updates carry heterogeneous values (a parsed
//! employee count next to a salary string straight from the query string), so
//! they are stored as [`SqlValue`] and coerced to the server-inferred parameter
//! type only when the statement is bound.

use bytes::BytesMut;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A single positional parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

fn is_text(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

fn encode_int(
    v: i64,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::INT8 => v.to_sql(ty, out),
        Type::NUMERIC => Decimal::from(v).to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        _ if is_text(ty) => v.to_string().to_sql(ty, out),
        _ => Err(format!("cannot bind integer to parameter of type {ty}").into()),
    }
}

fn encode_float(
    v: f64,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    match *ty {
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => v.to_sql(ty, out),
        Type::NUMERIC => Decimal::try_from(v)?.to_sql(ty, out),
        _ if is_text(ty) => v.to_string().to_sql(ty, out),
        _ => Err(format!("cannot bind float to parameter of type {ty}").into()),
    }
}

fn encode_text(
    s: &str,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 => encode_int(s.trim().parse::<i64>()?, ty, out),
        Type::NUMERIC => Decimal::from_str(s.trim())?.to_sql(ty, out),
        Type::FLOAT4 | Type::FLOAT8 => encode_float(s.trim().parse::<f64>()?, ty, out),
        Type::BOOL => s.trim().parse::<bool>()?.to_sql(ty, out),
        _ if is_text(ty) => s.to_sql(ty, out),
        _ => Err(format!("cannot bind text to parameter of type {ty}").into()),
    }
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(b) if *ty == Type::BOOL => b.to_sql(ty, out),
            SqlValue::Bool(b) if is_text(ty) => b.to_string().to_sql(ty, out),
            SqlValue::Bool(_) => Err(format!("cannot bind boolean to parameter of type {ty}").into()),
            SqlValue::Int(v) => encode_int(*v, ty, out),
            SqlValue::Float(v) => encode_float(*v, ty, out),
            SqlValue::Text(s) => encode_text(s, ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::NUMERIC
                | Type::FLOAT4
                | Type::FLOAT8
        ) || is_text(ty)
    }

    tokio_postgres::types::to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &SqlValue, ty: &Type) -> Result<BytesMut, Box<dyn Error + Sync + Send>> {
        let mut out = BytesMut::new();
        value.to_sql(ty, &mut out)?;
        Ok(out)
    }

    #[test]
    fn text_salary_coerces_to_int4() {
        let out = encode(&SqlValue::from("50000"), &Type::INT4).unwrap();
        assert_eq!(&out[..], &50000_i32.to_be_bytes());
    }

    #[test]
    fn malformed_text_fails_at_bind_time() {
        assert!(encode(&SqlValue::from("lots"), &Type::INT4).is_err());
    }

    #[test]
    fn int_out_of_range_for_int2_is_rejected() {
        assert!(encode(&SqlValue::Int(70_000), &Type::INT2).is_err());
    }

    #[test]
    fn int_binds_to_text_as_decimal_string() {
        let out = encode(&SqlValue::Int(32), &Type::TEXT).unwrap();
        assert_eq!(&out[..], b"32");
    }

    #[test]
    fn null_is_null_for_any_type() {
        let mut out = BytesMut::new();
        let is_null = SqlValue::Null.to_sql(&Type::INT4, &mut out).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(out.is_empty());
    }

    #[test]
    fn accepts_scalar_types_only() {
        assert!(<SqlValue as ToSql>::accepts(&Type::NUMERIC));
        assert!(<SqlValue as ToSql>::accepts(&Type::VARCHAR));
        assert!(!<SqlValue as ToSql>::accepts(&Type::JSONB));
    }

    #[test]
    fn deserializes_untagged_json() {
        let values: Vec<SqlValue> =
            serde_json::from_str(r#"[null, true, 32, 0.5, "Aliya"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                SqlValue::Null,
                SqlValue::Bool(true),
                SqlValue::Int(32),
                SqlValue::Float(0.5),
                SqlValue::Text("Aliya".into()),
            ]
        );
    }
}
