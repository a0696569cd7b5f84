//! Binds filter values to the parameter types Postgres inferred when the
//! statement was prepared.
//!
//! Filters arrive as JSON, so dates, timestamps and decimals are usually
//! strings and whole numbers are always `i64`. Postgres has no implicit cast
//! from `text` to `date` or from `int8` to `int4` parameters, so each value is
//! converted to the column's own type before it is sent.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use model::core::value::Value;
use rust_decimal::Decimal;
use std::{error::Error, str::FromStr};
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

use crate::sql::base::error::DbError;

#[derive(Debug, Clone, PartialEq)]
pub enum PgParam {
    Null,
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    Numeric(Decimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

impl PgParam {
    /// Converts `value` to the representation of `ty`. Types without a
    /// dedicated conversion are sent as text.
    pub fn coerce(value: Value, ty: &Type) -> Result<Self, String> {
        if value.is_null() {
            return Ok(PgParam::Null);
        }
        let param = match *ty {
            Type::BOOL => PgParam::Bool(to_bool(&value)?),
            Type::INT2 => PgParam::Int2(narrow(to_i64(&value)?)?),
            Type::INT4 => PgParam::Int4(narrow(to_i64(&value)?)?),
            Type::INT8 => PgParam::Int8(to_i64(&value)?),
            Type::FLOAT4 => PgParam::Float4(to_f64(&value)? as f32),
            Type::FLOAT8 => PgParam::Float8(to_f64(&value)?),
            Type::NUMERIC => PgParam::Numeric(to_decimal(&value)?),
            Type::DATE => PgParam::Date(to_date(&value)?),
            Type::TIMESTAMP => PgParam::Timestamp(to_timestamp(&value)?),
            Type::TIMESTAMPTZ => PgParam::TimestampTz(to_timestamp(&value)?.and_utc()),
            Type::UUID => PgParam::Uuid(match value {
                Value::Uuid(v) => v,
                other => Uuid::parse_str(text_of(other).trim()).map_err(|e| e.to_string())?,
            }),
            Type::JSON | Type::JSONB => PgParam::Json(match value {
                Value::Json(v) => v,
                Value::String(s) => serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s)),
                other => other.to_json(),
            }),
            Type::BYTEA => PgParam::Bytes(match value {
                Value::Bytes(v) => v,
                other => text_of(other).into_bytes(),
            }),
            _ => PgParam::Text(text_of(value)),
        };
        Ok(param)
    }
}

fn narrow<T: TryFrom<i64>>(v: i64) -> Result<T, String> {
    T::try_from(v).map_err(|_| format!("{v} is out of range"))
}

fn to_i64(value: &Value) -> Result<i64, String> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::Uint(v) => i64::try_from(*v).map_err(|_| format!("{v} is out of range")),
        Value::Float(v) if v.fract() == 0.0 => Ok(*v as i64),
        Value::Boolean(v) => Ok(i64::from(*v)),
        Value::String(s) => s.trim().parse().map_err(|_| format!("'{s}' is not an integer")),
        other => Err(format!("{other} is not an integer")),
    }
}

fn to_f64(value: &Value) -> Result<f64, String> {
    match value {
        Value::Int(v) => Ok(*v as f64),
        Value::Uint(v) => Ok(*v as f64),
        Value::Float(v) => Ok(*v),
        Value::String(s) => s.trim().parse().map_err(|_| format!("'{s}' is not a number")),
        other => Err(format!("{other} is not a number")),
    }
}

fn to_decimal(value: &Value) -> Result<Decimal, String> {
    match value {
        Value::Int(v) => Ok(Decimal::from(*v)),
        Value::Uint(v) => Ok(Decimal::from(*v)),
        Value::Float(v) => Decimal::try_from(*v).map_err(|e| e.to_string()),
        Value::String(s) => Decimal::from_str(s.trim()).map_err(|_| format!("'{s}' is not a number")),
        other => Err(format!("{other} is not a number")),
    }
}

fn to_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Boolean(v) => Ok(*v),
        Value::Int(0) => Ok(false),
        Value::Int(1) => Ok(true),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Ok(true),
            "false" | "f" | "no" | "n" | "0" => Ok(false),
            _ => Err(format!("'{s}' is not a boolean")),
        },
        other => Err(format!("{other} is not a boolean")),
    }
}

/// ISO dates, plus `yyyymmdd` as text or integer.
fn to_date(value: &Value) -> Result<NaiveDate, String> {
    let text = match value {
        Value::Date(d) => return Ok(*d),
        Value::Timestamp(ts) => return Ok(ts.date_naive()),
        Value::Int(v) => v.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => return Err(format!("{other} is not a date")),
    };
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&text, "%Y%m%d"))
        .or_else(|_| parse_datetime(&text).map(|dt| dt.date()))
        .map_err(|_| format!("'{text}' is not a date"))
}

/// Naive UTC timestamp. A bare date means midnight.
fn to_timestamp(value: &Value) -> Result<NaiveDateTime, String> {
    match value {
        Value::Timestamp(ts) => Ok(ts.naive_utc()),
        Value::String(s) => parse_datetime(s.trim())
            .or_else(|_| to_date(value).map(|d| d.and_time(NaiveTime::MIN)))
            .map_err(|_| format!("'{s}' is not a timestamp")),
        other => to_date(other).map(|d| d.and_time(NaiveTime::MIN)),
    }
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
}

fn text_of(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Int(v) => v.to_string(),
        Value::Uint(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Boolean(v) => v.to_string(),
        Value::Json(v) => v.to_string(),
        Value::Uuid(v) => v.to_string(),
        Value::Bytes(v) => String::from_utf8_lossy(&v).into_owned(),
        Value::Date(v) => v.to_string(),
        Value::Timestamp(v) => v.to_rfc3339(),
        Value::Null => String::new(),
    }
}

impl ToSql for PgParam {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            PgParam::Null => Ok(IsNull::Yes),
            PgParam::Bool(v) => encode(v, ty, out),
            PgParam::Int2(v) => encode(v, ty, out),
            PgParam::Int4(v) => encode(v, ty, out),
            PgParam::Int8(v) => encode(v, ty, out),
            PgParam::Float4(v) => encode(v, ty, out),
            PgParam::Float8(v) => encode(v, ty, out),
            PgParam::Numeric(v) => encode(v, ty, out),
            PgParam::Text(v) => encode(v, ty, out),
            PgParam::Date(v) => encode(v, ty, out),
            PgParam::Timestamp(v) => encode(v, ty, out),
            PgParam::TimestampTz(v) => encode(v, ty, out),
            PgParam::Uuid(v) => encode(v, ty, out),
            PgParam::Json(v) => encode(v, ty, out),
            PgParam::Bytes(v) => encode(v, ty, out),
        }
    }

    // the inner value checks the type in `encode`
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn encode<T: ToSql>(
    value: &T,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if !T::accepts(ty) {
        return Err(format!("cannot send {} as {ty}", std::any::type_name::<T>()).into());
    }
    value.to_sql(ty, out)
}

pub struct PgParamStore {
    params: Vec<PgParam>,
}

impl PgParamStore {
    /// Pairs each value with the parameter type of the prepared statement.
    pub fn bind(values: Vec<Value>, types: &[Type]) -> Result<Self, DbError> {
        if values.len() != types.len() {
            return Err(DbError::Unexpected(format!(
                "statement takes {} parameters, {} given",
                types.len(),
                values.len()
            )));
        }
        let params = values
            .into_iter()
            .zip(types)
            .enumerate()
            .map(|(index, (value, ty))| {
                PgParam::coerce(value, ty).map_err(|reason| DbError::Bind {
                    position: index + 1,
                    ty: ty.name().to_string(),
                    reason,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { params })
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_string_operand_follows_column_type() {
        let day = Value::String("2016-08-01".into());
        assert_eq!(
            PgParam::coerce(day.clone(), &Type::DATE),
            Ok(PgParam::Date(date(2016, 8, 1)))
        );
        assert_eq!(
            PgParam::coerce(day.clone(), &Type::VARCHAR),
            Ok(PgParam::Text("2016-08-01".into()))
        );
        assert_eq!(
            PgParam::coerce(day, &Type::TIMESTAMP),
            Ok(PgParam::Timestamp(date(2016, 8, 1).and_time(NaiveTime::MIN)))
        );
    }

    #[test]
    fn test_integers_fit_narrow_columns() {
        assert_eq!(PgParam::coerce(Value::Int(42), &Type::INT4), Ok(PgParam::Int4(42)));
        assert_eq!(PgParam::coerce(Value::Int(7), &Type::INT2), Ok(PgParam::Int2(7)));
        assert!(PgParam::coerce(Value::Int(i64::MAX), &Type::INT4).is_err());
        assert_eq!(
            PgParam::coerce(Value::Int(20160801), &Type::DATE),
            Ok(PgParam::Date(date(2016, 8, 1)))
        );
        assert_eq!(
            PgParam::coerce(Value::Int(42), &Type::TEXT),
            Ok(PgParam::Text("42".into()))
        );
    }

    #[test]
    fn test_numeric_and_boolean_text() {
        assert_eq!(
            PgParam::coerce(Value::String("1250.75".into()), &Type::NUMERIC),
            Ok(PgParam::Numeric(Decimal::from_str("1250.75").unwrap()))
        );
        assert_eq!(
            PgParam::coerce(Value::String("Y".into()), &Type::BOOL),
            Ok(PgParam::Bool(true))
        );
        assert_eq!(PgParam::coerce(Value::Null, &Type::DATE), Ok(PgParam::Null));
    }

    #[test]
    fn test_bind_reports_position_and_type() {
        let err = PgParamStore::bind(
            vec![Value::String("O".into()), Value::String("soon".into())],
            &[Type::VARCHAR, Type::DATE],
        )
        .err()
        .unwrap();
        match err {
            DbError::Bind { position, ty, .. } => {
                assert_eq!(position, 2);
                assert_eq!(ty, "date");
            }
            other => panic!("expected a bind error, got {other}"),
        }

        let store = PgParamStore::bind(vec![Value::Int(1)], &[Type::INT8]).unwrap();
        assert_eq!(store.as_refs().len(), 1);
    }

    #[test]
    fn test_encode_rejects_mismatched_type() {
        let mut out = BytesMut::new();
        assert!(PgParam::Text("x".into()).to_sql(&Type::DATE, &mut out).is_err());
        assert!(PgParam::Date(date(2016, 8, 1)).to_sql(&Type::DATE, &mut out).is_ok());
    }
}
