//! Name / signature lookup of functions and events in a descriptor.

use brokercodec_core::{
    error::NotFoundError, types::ParamType, ContractDescriptor, EventSpec, FunctionSpec,
};

/// Find the function called `name` whose input types equal `arg_types`.
///
/// Overloads are told apart by their argument types only.
pub fn resolve_function<'d>(
    descriptor: &'d ContractDescriptor,
    name: &str,
    arg_types: &[ParamType],
) -> Result<&'d FunctionSpec, NotFoundError> {
    let candidates: Vec<&FunctionSpec> = descriptor.functions_named(name);
    if candidates.is_empty() {
        return Err(NotFoundError::Function { name: name.into() });
    }
    candidates
        .iter()
        .copied()
        .find(|f| f.inputs.len() == arg_types.len() && f.inputs.iter().zip(arg_types).all(|(p, t)| &p.ty == t))
        .ok_or_else(|| NotFoundError::Overload {
            name: name.into(),
            arg_types: join_types(arg_types),
            candidates: candidates.iter().map(|f| f.signature()).collect(),
        })
}

/// Find a function by name alone. Fails with `Ambiguous` when the name is
/// overloaded.
pub fn resolve_function_by_name<'d>(
    descriptor: &'d ContractDescriptor,
    name: &str,
) -> Result<&'d FunctionSpec, NotFoundError> {
    let candidates: Vec<&FunctionSpec> = descriptor.functions_named(name);
    match candidates.as_slice() {
        [] => Err(NotFoundError::Function { name: name.into() }),
        [only] => Ok(*only),
        many => Err(NotFoundError::Ambiguous {
            name: name.into(),
            candidates: many.iter().map(|f| f.signature()).collect(),
        }),
    }
}

/// Resolve either a bare name (`getJobInfo`) or a full signature
/// (`getJobInfo(address,string,uint256)`).
pub fn resolve_function_query<'d>(
    descriptor: &'d ContractDescriptor,
    query: &str,
) -> Result<&'d FunctionSpec, NotFoundError> {
    let query = query.trim();
    match split_signature(query) {
        Some((name, types)) => resolve_function(descriptor, name, &types),
        None if query.contains('(') => Err(NotFoundError::Function { name: query.into() }),
        None => resolve_function_by_name(descriptor, query),
    }
}

/// Find an event by name, or by full signature when `query` contains `(`.
pub fn resolve_event<'d>(descriptor: &'d ContractDescriptor, query: &str) -> Result<&'d EventSpec, NotFoundError> {
    let query = query.trim();
    if query.contains('(') {
        return descriptor
            .event(&canonical_query(query).unwrap_or_default())
            .ok_or_else(|| NotFoundError::Event { name: query.into() });
    }
    let candidates: Vec<&EventSpec> = descriptor.events_named(query);
    match candidates.as_slice() {
        [] => Err(NotFoundError::Event { name: query.into() }),
        [only] => Ok(*only),
        many => Err(NotFoundError::Ambiguous {
            name: query.into(),
            candidates: many.iter().map(|e| e.signature()).collect(),
        }),
    }
}

/// Find the (non-anonymous) event whose signature hash is `topic`.
pub fn event_for_topic<'d>(descriptor: &'d ContractDescriptor, topic: &[u8; 32]) -> Result<&'d EventSpec, NotFoundError> {
    descriptor
        .event_by_topic(topic)
        .ok_or(NotFoundError::Topic { topic: *topic })
}

/// Find the function whose selector is `selector`.
pub fn function_for_selector(descriptor: &ContractDescriptor, selector: [u8; 4]) -> Result<&FunctionSpec, NotFoundError> {
    descriptor
        .function_by_selector(selector)
        .ok_or(NotFoundError::Selector { selector })
}

/// `name(t1,t2)` → (`name`, [t1, t2]). `None` if the text is not a
/// well-formed signature.
fn split_signature(query: &str) -> Option<(&str, Vec<ParamType>)> {
    let open = query.find('(')?;
    let name = query[..open].trim();
    if name.is_empty() {
        return None;
    }
    // the argument list parses as a tuple type
    match query[open..].trim().parse::<ParamType>().ok()? {
        ParamType::Tuple(types) => Some((name, types)),
        _ => None,
    }
}

/// Canonicalise a user-written signature (`Foo(uint, address)` → `Foo(uint256,address)`).
fn canonical_query(query: &str) -> Option<String> {
    split_signature(query).map(|(name, types)| format!("{name}({})", join_types(&types)))
}

fn join_types(types: &[ParamType]) -> String {
    types.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use brokercodec_core::{EventParam, ParamSpec, StateMutability};

    fn func(name: &str, inputs: &[&str]) -> FunctionSpec {
        FunctionSpec::new(
            name,
            inputs
                .iter()
                .enumerate()
                .map(|(i, t)| ParamSpec::new(format!("p{i}"), t.parse().unwrap()))
                .collect(),
            vec![],
            StateMutability::NonPayable,
        )
    }

    fn descriptor() -> ContractDescriptor {
        ContractDescriptor::new(
            Address::ZERO,
            vec![
                func("refund", &["address", "string", "uint32"]),
                func("pay", &["uint256"]),
                func("pay", &["uint256", "address"]),
            ],
            vec![EventSpec::new(
                "LogRefund",
                vec![
                    EventParam::new("clusterAddress", ParamType::Address, false),
                    EventParam::new("jobKey", ParamType::String, false),
                    EventParam::new("index", ParamType::Uint(32), false),
                ],
            )],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn exact_types_pick_overload() {
        let d = descriptor();
        let f = resolve_function(&d, "pay", &[ParamType::Uint(256), ParamType::Address]).unwrap();
        assert_eq!(f.signature(), "pay(uint256,address)");
    }

    #[test]
    fn unknown_name_is_not_found() {
        let d = descriptor();
        let err = resolve_function(&d, "doesNotExist", &[]).unwrap_err();
        assert_eq!(err, NotFoundError::Function { name: "doesNotExist".into() });
    }

    #[test]
    fn type_mismatch_lists_candidates() {
        let d = descriptor();
        let err = resolve_function(&d, "pay", &[ParamType::Bool]).unwrap_err();
        match err {
            NotFoundError::Overload { arg_types, candidates, .. } => {
                assert_eq!(arg_types, "bool");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bare_name_of_overload_is_ambiguous() {
        let d = descriptor();
        assert!(matches!(
            resolve_function_by_name(&d, "pay"),
            Err(NotFoundError::Ambiguous { .. })
        ));
        assert!(resolve_function_by_name(&d, "refund").is_ok());
    }

    #[test]
    fn query_accepts_signature_with_aliases() {
        let d = descriptor();
        let f = resolve_function_query(&d, "pay(uint, address)").unwrap();
        assert_eq!(f.inputs.len(), 2);
        assert!(resolve_function_query(&d, "refund").is_ok());
        assert!(resolve_function_query(&d, "pay(").is_err());
    }

    #[test]
    fn events_by_name_signature_and_topic() {
        let d = descriptor();
        let by_name = resolve_event(&d, "LogRefund").unwrap();
        let by_sig = resolve_event(&d, "LogRefund(address,string,uint32)").unwrap();
        assert_eq!(by_name, by_sig);
        let topic = by_name.topic();
        assert_eq!(event_for_topic(&d, &topic).unwrap().name, "LogRefund");
        assert!(matches!(
            event_for_topic(&d, &[0u8; 32]),
            Err(NotFoundError::Topic { .. })
        ));
        assert!(matches!(resolve_event(&d, "LogNope"), Err(NotFoundError::Event { .. })));
    }
}
