//! Argument resolution.
//!
//! Turns caller input into a [`ResolvedRequest`] with every default applied
//! and every grammar checked. Two entry points share the same rules: the
//! typed functions ([`lookup`], [`associate`], ...) take option structs, and
//! [`resolve`] takes a loosely typed argument list whose last element is the
//! completion handler.

use serde_json::Value;
use std::fmt;

use crate::config::FilterPolicy;
use crate::error::{ArgumentError, ResolveError, ValidationError};
use crate::grammar::{is_concept_uri, is_term_list_path};
use crate::options::{
    AssociationOptions, LookupOptions, SearchParams, UriOptions, DEFAULT_ASSOCIATION_LIMIT,
    DEFAULT_LANGUAGE, DEFAULT_LOOKUP_LIMIT,
};

/// Every operation needs at least an input and a completion handler.
pub const MIN_ARGS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Lookup,
    ResolveUri,
    Search,
    Associate,
    Relatedness,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Lookup => "lookup",
            Operation::ResolveUri => "resolve_uri",
            Operation::Search => "search",
            Operation::Associate => "associate",
            Operation::Relatedness => "relatedness",
        }
    }

    /// Search has no options slot: its input already is the parameter map.
    pub fn max_args(self) -> usize {
        match self {
            Operation::Search => 2,
            _ => 3,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    pub uri: String,
    pub limit: u64,
    pub offset: u64,
    pub core: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriQuery {
    pub text: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationQuery {
    pub input: String,
    pub limit: u64,
    pub filter: Option<String>,
}

/// A request with all defaults applied and all validation passed.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRequest {
    Lookup(LookupQuery),
    ResolveUri(UriQuery),
    Search(SearchParams),
    Associate(AssociationQuery),
    Relatedness(AssociationQuery),
}

impl ResolvedRequest {
    pub fn operation(&self) -> Operation {
        match self {
            ResolvedRequest::Lookup(_) => Operation::Lookup,
            ResolvedRequest::ResolveUri(_) => Operation::ResolveUri,
            ResolvedRequest::Search(_) => Operation::Search,
            ResolvedRequest::Associate(_) => Operation::Associate,
            ResolvedRequest::Relatedness(_) => Operation::Relatedness,
        }
    }
}

/// One loosely typed argument: a JSON value or a completion handler `C`.
pub enum Arg<C> {
    Value(Value),
    Callback(C),
}

impl<C> Arg<C> {
    pub fn value(value: impl Into<Value>) -> Self {
        Arg::Value(value.into())
    }

    fn describe(&self) -> String {
        match self {
            Arg::Value(v) => v.to_string(),
            Arg::Callback(_) => "<callback>".to_string(),
        }
    }
}

impl<C> From<Value> for Arg<C> {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl<C> fmt::Debug for Arg<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Arg::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Output of [`resolve`]: the request plus the handler that receives its
/// completion.
#[derive(Debug)]
pub struct Resolved<C> {
    pub request: ResolvedRequest,
    pub completion: C,
}

/// Resolve a loosely typed argument list for `operation`.
///
/// Checks run in order: arity, primary input type, options type, completion
/// handler, per-key defaults, input grammar, filter grammar. The first
/// failure is returned.
pub fn resolve<C>(
    operation: Operation,
    args: Vec<Arg<C>>,
    policy: FilterPolicy,
) -> Result<Resolved<C>, ResolveError> {
    let supplied = args.len();
    let mut args = args.into_iter();
    let (primary, last) = match (args.next(), args.next_back()) {
        (Some(primary), Some(last)) => (primary, last),
        _ => {
            return Err(ArgumentError::Insufficient {
                operation,
                required: MIN_ARGS,
                supplied,
            }
            .into())
        }
    };
    if supplied > operation.max_args() {
        return Err(ArgumentError::TooMany {
            operation,
            allowed: operation.max_args(),
            supplied,
        }
        .into());
    }
    let middle = args.next();

    let (request, completion) = match operation {
        Operation::Lookup => {
            let uri = primary_string(&primary)?;
            let options = options_value(operation, middle.as_ref())?;
            let completion = into_callback(last)?;
            let options = options
                .map(LookupOptions::from_json)
                .transpose()?
                .unwrap_or_default();
            (lookup(uri, &options), completion)
        }
        Operation::ResolveUri => {
            let text = primary_string(&primary)?;
            let options = options_value(operation, middle.as_ref())?;
            let completion = into_callback(last)?;
            let options = options
                .map(UriOptions::from_json)
                .transpose()?
                .unwrap_or_default();
            (resolve_uri(text, &options), completion)
        }
        Operation::Search => {
            let params = SearchParams::from_json(option_value(&primary)?)?;
            (search(params), into_callback(last)?)
        }
        Operation::Associate | Operation::Relatedness => {
            let options = options_value(operation, middle.as_ref())?;
            let completion = into_callback(last)?;
            let options = options
                .map(AssociationOptions::from_json)
                .transpose()?
                .unwrap_or_default();
            let input = match &primary {
                Arg::Value(Value::String(s)) => s.as_str(),
                other => return Err(ValidationError::Input(other.describe()).into()),
            };
            let request = if operation == Operation::Associate {
                associate(input, &options, policy)?
            } else {
                relatedness(input, &options, policy)?
            };
            (request, completion)
        }
    };

    tracing::debug!(%operation, supplied, "Resolved arguments");
    Ok(Resolved {
        request,
        completion,
    })
}

fn primary_string<C>(arg: &Arg<C>) -> Result<&str, ArgumentError> {
    match arg {
        Arg::Value(Value::String(s)) => Ok(s),
        _ => Err(ArgumentError::InvalidType("primary input")),
    }
}

fn option_value<C>(arg: &Arg<C>) -> Result<&Value, ArgumentError> {
    match arg {
        Arg::Value(value) => Ok(value),
        Arg::Callback(_) => Err(ArgumentError::InvalidType("options")),
    }
}

/// Shape check of the optional middle argument. Only resolve-to-URI takes a
/// bare language string there.
fn options_value<'a, C>(
    operation: Operation,
    middle: Option<&'a Arg<C>>,
) -> Result<Option<&'a Value>, ArgumentError> {
    let Some(arg) = middle else {
        return Ok(None);
    };
    let value = option_value(arg)?;
    let bare_language = operation == Operation::ResolveUri && value.is_string();
    if value.is_object() || bare_language {
        Ok(Some(value))
    } else {
        Err(ArgumentError::InvalidType("options"))
    }
}

fn into_callback<C>(arg: Arg<C>) -> Result<C, ArgumentError> {
    match arg {
        Arg::Callback(callback) => Ok(callback),
        Arg::Value(_) => Err(ArgumentError::InvalidType("completion handler")),
    }
}

/// Resolve a lookup of `uri`.
pub fn lookup(uri: &str, options: &LookupOptions) -> ResolvedRequest {
    ResolvedRequest::Lookup(LookupQuery {
        uri: uri.to_string(),
        limit: positive_or(options.limit, DEFAULT_LOOKUP_LIMIT),
        offset: options.offset.unwrap_or(0),
        core: options.filter.as_deref() == Some("core"),
    })
}

/// Resolve a text to URI query.
pub fn resolve_uri(text: &str, options: &UriOptions) -> ResolvedRequest {
    let language = options
        .language
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);
    ResolvedRequest::ResolveUri(UriQuery {
        text: text.to_string(),
        language: language.to_string(),
    })
}

pub fn search(params: SearchParams) -> ResolvedRequest {
    ResolvedRequest::Search(params)
}

/// Resolve an association query; `input` must be a concept URI or a
/// term-list path.
pub fn associate(
    input: &str,
    options: &AssociationOptions,
    policy: FilterPolicy,
) -> Result<ResolvedRequest, ValidationError> {
    association_query(input, options, policy).map(ResolvedRequest::Associate)
}

/// Same rules as [`associate`], against the relatedness endpoint.
pub fn relatedness(
    input: &str,
    options: &AssociationOptions,
    policy: FilterPolicy,
) -> Result<ResolvedRequest, ValidationError> {
    association_query(input, options, policy).map(ResolvedRequest::Relatedness)
}

fn association_query(
    input: &str,
    options: &AssociationOptions,
    policy: FilterPolicy,
) -> Result<AssociationQuery, ValidationError> {
    let limit = positive_or(options.limit, DEFAULT_ASSOCIATION_LIMIT);

    if !is_concept_uri(input) && !is_term_list_path(input) {
        return Err(ValidationError::Input(input.to_string()));
    }

    let filter = options.filter.as_deref().filter(|f| !f.is_empty());
    if let Some(filter) = filter {
        if policy == FilterPolicy::Strict && !is_concept_uri(filter) {
            return Err(ValidationError::Filter(filter.to_string()));
        }
    }

    Ok(AssociationQuery {
        input: input.to_string(),
        limit,
        filter: filter.map(str::to_string),
    })
}

fn positive_or(value: Option<u64>, default: u64) -> u64 {
    value.filter(|&n| n > 0).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    type Handler = fn();

    fn noop() {}

    fn cb() -> Arg<Handler> {
        Arg::Callback(noop as Handler)
    }

    fn run(operation: Operation, args: Vec<Arg<Handler>>) -> Result<ResolvedRequest, ResolveError> {
        resolve(operation, args, FilterPolicy::Strict).map(|r| r.request)
    }

    #[test]
    fn test_insufficient_arguments() {
        for operation in [
            Operation::Lookup,
            Operation::ResolveUri,
            Operation::Search,
            Operation::Associate,
            Operation::Relatedness,
        ] {
            let err = run(operation, vec![Arg::value("/c/en/toast")]).unwrap_err();
            assert!(matches!(
                err,
                ResolveError::Argument(ArgumentError::Insufficient { supplied: 1, .. })
            ));
            let err = run(operation, vec![]).unwrap_err();
            assert!(matches!(
                err,
                ResolveError::Argument(ArgumentError::Insufficient { supplied: 0, .. })
            ));
        }
    }

    #[test]
    fn test_too_many_arguments() {
        let err = run(
            Operation::Lookup,
            vec![Arg::value("/c/en/toast"), Arg::value(json!({})), Arg::value(1), cb()],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Argument(ArgumentError::TooMany { allowed: 3, supplied: 4, .. })
        ));

        let err = run(Operation::Search, vec![Arg::value(json!({})), cb(), cb()]).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Argument(ArgumentError::TooMany { allowed: 2, .. })
        ));
    }

    #[test]
    fn test_primary_input_must_be_string() {
        for value in [json!(5), json!(true), json!(null), json!([]), json!({})] {
            let err = run(Operation::Lookup, vec![Arg::value(value.clone()), cb()]).unwrap_err();
            assert_eq!(err, ArgumentError::InvalidType("primary input").into());

            let err = run(Operation::ResolveUri, vec![Arg::value(value), cb()]).unwrap_err();
            assert_eq!(err, ArgumentError::InvalidType("primary input").into());
        }
        let err = run(Operation::Lookup, vec![cb(), cb()]).unwrap_err();
        assert_eq!(err, ArgumentError::InvalidType("primary input").into());
    }

    #[test]
    fn test_options_must_be_object() {
        for value in [json!("5"), json!(5), json!(true), json!(null), json!([])] {
            let err = run(
                Operation::Lookup,
                vec![Arg::value("/c/en/toast"), Arg::value(value.clone()), cb()],
            )
            .unwrap_err();
            assert_eq!(err, ArgumentError::InvalidType("options").into());

            let err = run(
                Operation::Associate,
                vec![Arg::value("/c/en/hotdog"), Arg::value(value), cb()],
            )
            .unwrap_err();
            assert_eq!(err, ArgumentError::InvalidType("options").into());
        }
        let err = run(Operation::Lookup, vec![Arg::value("/c/en/toast"), cb(), cb()]).unwrap_err();
        assert_eq!(err, ArgumentError::InvalidType("options").into());
    }

    #[test]
    fn test_completion_must_be_callback() {
        for value in [json!("5"), json!(5), json!(true), json!(null), json!([]), json!({})] {
            let err = run(Operation::Lookup, vec![Arg::value("/c/en/toast"), Arg::value(value.clone())])
                .unwrap_err();
            assert_eq!(err, ArgumentError::InvalidType("completion handler").into());

            let err = run(Operation::Search, vec![Arg::value(json!({"start": "/c/en/donut"})), Arg::value(value)])
                .unwrap_err();
            assert_eq!(err, ArgumentError::InvalidType("completion handler").into());
        }
    }

    #[test]
    fn test_lookup_defaults() {
        let request = run(Operation::Lookup, vec![Arg::value("/c/en/toast"), cb()]).unwrap();
        assert_eq!(
            request,
            ResolvedRequest::Lookup(LookupQuery {
                uri: "/c/en/toast".to_string(),
                limit: 50,
                offset: 0,
                core: false,
            })
        );

        let request = run(
            Operation::Lookup,
            vec![
                Arg::value("/c/en/toast"),
                Arg::value(json!({"limit": 2, "offset": 0, "filter": "core"})),
                cb(),
            ],
        )
        .unwrap();
        let ResolvedRequest::Lookup(query) = request else {
            panic!("expected lookup");
        };
        assert_eq!(query.limit, 2);
        assert_eq!(query.offset, 0);
        assert!(query.core);
    }

    #[test]
    fn test_resolve_uri_language() {
        let request = run(Operation::ResolveUri, vec![Arg::value("ground beef"), cb()]).unwrap();
        assert_eq!(
            request,
            ResolvedRequest::ResolveUri(UriQuery {
                text: "ground beef".to_string(),
                language: "en".to_string(),
            })
        );

        let request = run(
            Operation::ResolveUri,
            vec![Arg::value("車"), Arg::value("ja"), cb()],
        )
        .unwrap();
        let ResolvedRequest::ResolveUri(query) = request else {
            panic!("expected resolve_uri");
        };
        assert_eq!(query.language, "ja");
    }

    #[test]
    fn test_association_input_grammar() {
        let err = run(
            Operation::Associate,
            vec![
                Arg::value("hotdog"),
                Arg::value(json!({"limit": 10, "filter": "/c/en/donut"})),
                cb(),
            ],
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::Input("hotdog".to_string()).into());

        let err = run(Operation::Relatedness, vec![Arg::value(5), cb()]).unwrap_err();
        assert!(matches!(err, ResolveError::Validation(ValidationError::Input(_))));

        let request = run(Operation::Associate, vec![Arg::value("/list/en/toast,cereal"), cb()]).unwrap();
        assert_eq!(
            request,
            ResolvedRequest::Associate(AssociationQuery {
                input: "/list/en/toast,cereal".to_string(),
                limit: 10,
                filter: None,
            })
        );
    }

    #[test]
    fn test_filter_policy() {
        let args = || {
            vec![
                Arg::value("/c/en/hotdog"),
                Arg::value(json!({"limit": 10, "filter": "donut"})),
                cb(),
            ]
        };

        let err = resolve(Operation::Associate, args(), FilterPolicy::Strict).unwrap_err();
        assert_eq!(err, ValidationError::Filter("donut".to_string()).into());

        let resolved = resolve(Operation::Associate, args(), FilterPolicy::Lenient).unwrap();
        let ResolvedRequest::Associate(query) = resolved.request else {
            panic!("expected associate");
        };
        assert_eq!(query.filter.as_deref(), Some("donut"));
    }

    #[test]
    fn test_argument_errors_precede_validation() {
        // Bad input grammar and a bad handler: the handler is reported
        let err = run(Operation::Associate, vec![Arg::value("hotdog"), Arg::value(1)]).unwrap_err();
        assert_eq!(err, ArgumentError::InvalidType("completion handler").into());
    }

    #[test]
    fn test_handler_checked_before_option_keys() {
        let err = run(
            Operation::Lookup,
            vec![Arg::value("/c/en/toast"), Arg::value(json!({"limit": -1})), Arg::value(5)],
        )
        .unwrap_err();
        assert_eq!(err, ArgumentError::InvalidType("completion handler").into());

        let err = run(
            Operation::Associate,
            vec![Arg::value("/c/en/cat"), Arg::value(json!({"filter": 3})), Arg::value(5)],
        )
        .unwrap_err();
        assert_eq!(err, ArgumentError::InvalidType("completion handler").into());

        let err = run(
            Operation::ResolveUri,
            vec![Arg::value("toast"), Arg::value(json!({"language": 7})), Arg::value(5)],
        )
        .unwrap_err();
        assert_eq!(err, ArgumentError::InvalidType("completion handler").into());

        // Options of the wrong shape still come first
        let err = run(
            Operation::Lookup,
            vec![Arg::value("/c/en/toast"), Arg::value(json!([1])), Arg::value(5)],
        )
        .unwrap_err();
        assert_eq!(err, ArgumentError::InvalidType("options").into());

        // With a real handler the bad key is reported
        let err = run(
            Operation::Lookup,
            vec![Arg::value("/c/en/toast"), Arg::value(json!({"limit": -1})), cb()],
        )
        .unwrap_err();
        assert_eq!(err, ArgumentError::InvalidType("limit").into());
    }

    #[test]
    fn test_typed_defaults_are_independent() {
        let ResolvedRequest::Lookup(query) =
            lookup("/c/en/toast", &LookupOptions::default().limit(0).offset(20))
        else {
            panic!("expected lookup");
        };
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 20);

        let ResolvedRequest::ResolveUri(query) =
            resolve_uri("toast", &UriOptions::default().language(""))
        else {
            panic!("expected resolve_uri");
        };
        assert_eq!(query.language, "en");
    }
}
