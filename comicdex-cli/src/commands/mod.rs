pub(crate) mod category;
pub(crate) mod comic;
pub(crate) mod config;
pub(crate) mod reference;

use chrono::{DateTime, Utc};
use serde::Serialize;

use comicdex_catalog::params::parse_order_bys;
use comicdex_catalog::ListParams;

use crate::cli_types::ListArgs;
use crate::CliError;

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn list_params(args: &ListArgs) -> Result<ListParams, CliError> {
    let order_bys =
        parse_order_bys(&args.order_by).map_err(|e| CliError::argument(e.to_string()))?;
    Ok(ListParams {
        order_bys,
        ..ListParams::page(args.page, args.limit)
    })
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CliError::argument(format!("{value:?} is not an RFC 3339 time: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_terms_are_parsed_in_order() {
        let args = ListArgs {
            page: 2,
            limit: 5,
            order_by: vec!["code".to_string(), "published_from:desc:last".to_string()],
        };
        let params = list_params(&args).unwrap();
        assert_eq!(params.order_bys.len(), 2);
        assert_eq!(params.order_bys[1].to_string(), "published_from DESC NULLS LAST");
        assert_eq!(params.pagination.unwrap().page, 2);
    }

    #[test]
    fn bad_order_term_names_its_position() {
        let args = ListArgs {
            page: 1,
            limit: 10,
            order_by: vec!["code".to_string(), "code:sideways".to_string()],
        };
        let err = list_params(&args).unwrap_err();
        assert!(err.to_string().contains("2nd"), "{err}");
    }

    #[test]
    fn timestamps_are_normalised_to_utc() {
        let t = parse_timestamp("2024-05-01T09:00:00+02:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2024-05-01T07:00:00+00:00");
        assert!(parse_timestamp("yesterday").is_err());
    }
}
