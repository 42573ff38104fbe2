//! Text parsers for field paths and sort expressions.
//!
//! Accepts the compact forms used by callers of the storage layer:
//! `"rel_id.property"` field paths and `"rel_id.property desc"` sort
//! expressions.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, opt},
    multi::separated_list1,
};
use thiserror::Error;

use super::values::{QField, QSort, SortDirection};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryParseError {
    #[error("invalid field path `{text}`")]
    InvalidPath { text: String },
    #[error("invalid sort expression `{text}`")]
    InvalidSort { text: String },
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_').parse(input)
}

fn dotted_path(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char('.'), identifier).parse(input)
}

fn sort_direction(input: &str) -> IResult<&str, SortDirection> {
    alt((
        tag_no_case("asc").map(|_| SortDirection::Ascending),
        tag_no_case("desc").map(|_| SortDirection::Descending),
    ))
    .parse(input)
}

fn sort_expression(input: &str) -> IResult<&str, (Vec<&str>, Option<SortDirection>)> {
    let (input, _) = multispace0.parse(input)?;
    let (input, path) = dotted_path(input)?;
    let (input, direction) = opt((multispace1, sort_direction).map(|(_, d)| d)).parse(input)?;
    let (input, _) = multispace0.parse(input)?;
    Ok((input, (path, direction)))
}

/// Parse a dot-separated field path into its segments.
pub fn parse_field_path(text: &str) -> Result<Vec<String>, QueryParseError> {
    match all_consuming(dotted_path).parse(text.trim()) {
        Ok((_, segments)) => Ok(segments.into_iter().map(|s| s.to_string()).collect()),
        Err(_) => Err(QueryParseError::InvalidPath {
            text: text.to_string(),
        }),
    }
}

/// Parse a `"path [asc|desc]"` sort expression. Direction defaults to
/// ascending.
pub fn parse_sort_expression(text: &str) -> Result<QSort, QueryParseError> {
    match all_consuming(sort_expression).parse(text) {
        Ok((_, (segments, direction))) => {
            let path = segments.join(".");
            Ok(QSort {
                field: QField::from_path(&path),
                direction: direction.unwrap_or(SortDirection::Ascending),
            })
        }
        Err(_) => Err(QueryParseError::InvalidSort {
            text: text.to_string(),
        }),
    }
}

impl std::str::FromStr for QSort {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_sort_expression(s)
    }
}
