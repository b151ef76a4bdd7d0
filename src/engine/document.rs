// GraphQL document front end
// Parses query text with async-graphql's parser and lowers it into a Request

//! # Document Lowering
//!
//! The engine executes [`Request`] trees, not documents. This module turns a
//! GraphQL document into one:
//!
//! - the operation is picked by name when the document has several
//! - variables are substituted (explicit value, then the declared default)
//! - fragment spreads and inline fragments are flattened into their parent
//! - `@skip(if:)` / `@include(if:)` are applied
//! - fields sharing a response key are merged; a key naming two different
//!   fields, or one field with different arguments, is rejected
//!
//! Fragment type conditions are not checked here. Every type in the schema is
//! an object type, so a fragment always applies to its enclosing selection;
//! a field the enclosing type lacks is reported by validation.
//!
//! Subscriptions are rejected.

use async_graphql::parser::types::{
    Directive, DocumentOperations, ExecutableDocument, OperationDefinition, OperationType,
    Selection, SelectionSet,
};
use async_graphql::parser::Positioned;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::engine::selection::{Arguments, Field, OperationKind, Request};
use crate::{MovieGraphError, Result};

/// Parse `source` and lower the chosen operation into a [`Request`]
pub fn parse_request(
    source: &str,
    operation_name: Option<&str>,
    variables: Option<&Map<String, Value>>,
) -> Result<Request> {
    let document = async_graphql::parser::parse_query(source)
        .map_err(|e| MovieGraphError::Parse(e.to_string()))?;
    let operation = select_operation(&document, operation_name)?;

    let kind = match operation.ty {
        OperationType::Query => OperationKind::Query,
        OperationType::Mutation => OperationKind::Mutation,
        OperationType::Subscription => {
            return Err(MovieGraphError::InvalidSelection(
                "subscriptions are not supported".to_string(),
            ))
        }
    };

    let variables = bind_variables(operation, variables)?;
    let lowering = Lowering {
        document: &document,
        variables: &variables,
    };
    let mut visiting = HashSet::new();
    let selection = lowering.selection_set(&operation.selection_set.node, &mut visiting)?;

    Ok(Request {
        operation: kind,
        selection,
    })
}

fn select_operation<'d>(
    document: &'d ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<&'d OperationDefinition> {
    match (&document.operations, operation_name) {
        (DocumentOperations::Single(operation), _) => Ok(&operation.node),
        (DocumentOperations::Multiple(operations), Some(name)) => operations
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, operation)| &operation.node)
            .ok_or_else(|| {
                MovieGraphError::InvalidSelection(format!("unknown operation '{}'", name))
            }),
        (DocumentOperations::Multiple(operations), None) if operations.len() == 1 => operations
            .values()
            .next()
            .map(|operation| &operation.node)
            .ok_or_else(|| MovieGraphError::InvalidSelection("document has no operations".into())),
        (DocumentOperations::Multiple(_), None) => Err(MovieGraphError::InvalidSelection(
            "document contains several operations; an operation name is required".to_string(),
        )),
    }
}

fn bind_variables(
    operation: &OperationDefinition,
    provided: Option<&Map<String, Value>>,
) -> Result<Map<String, Value>> {
    let mut bound = Map::new();
    for definition in &operation.variable_definitions {
        let definition = &definition.node;
        let name = definition.name.node.as_str();
        let value = match provided.and_then(|vars| vars.get(name)) {
            Some(value) => value.clone(),
            None => match &definition.default_value {
                Some(default) => default.node.clone().into_json()?,
                None => Value::Null,
            },
        };
        if value.is_null() && !definition.var_type.node.nullable {
            return Err(MovieGraphError::InvalidArgument(format!(
                "variable '${}' of type '{}' is required",
                name, definition.var_type.node
            )));
        }
        bound.insert(name.to_string(), value);
    }
    Ok(bound)
}

struct Lowering<'d> {
    document: &'d ExecutableDocument,
    variables: &'d Map<String, Value>,
}

impl Lowering<'_> {
    fn selection_set(
        &self,
        set: &SelectionSet,
        visiting: &mut HashSet<String>,
    ) -> Result<Vec<Field>> {
        let mut fields = Vec::new();
        self.collect(set, visiting, &mut fields)?;
        Ok(fields)
    }

    fn collect(
        &self,
        set: &SelectionSet,
        visiting: &mut HashSet<String>,
        out: &mut Vec<Field>,
    ) -> Result<()> {
        for item in &set.items {
            match &item.node {
                Selection::Field(field) => {
                    let field = &field.node;
                    if !self.included(&field.directives)? {
                        continue;
                    }
                    let mut arguments = Arguments::new();
                    for (name, value) in &field.arguments {
                        let value = value.node.clone().into_const_with(|n| self.variable(n))?;
                        arguments.insert(name.node.as_str(), value.into_json()?);
                    }
                    let lowered = Field {
                        alias: field.alias.as_ref().map(|a| a.node.to_string()),
                        name: field.name.node.to_string(),
                        arguments,
                        selection: self.selection_set(&field.selection_set.node, visiting)?,
                    };
                    merge_field(out, lowered)?;
                }
                Selection::FragmentSpread(spread) => {
                    let spread = &spread.node;
                    if !self.included(&spread.directives)? {
                        continue;
                    }
                    let name = spread.fragment_name.node.as_str();
                    let fragment = self
                        .document
                        .fragments
                        .iter()
                        .find(|(n, _)| n.as_str() == name)
                        .map(|(_, fragment)| &fragment.node)
                        .ok_or_else(|| {
                            MovieGraphError::InvalidSelection(format!("unknown fragment '{}'", name))
                        })?;
                    if !visiting.insert(name.to_string()) {
                        return Err(MovieGraphError::InvalidSelection(format!(
                            "fragment '{}' spreads itself",
                            name
                        )));
                    }
                    self.collect(&fragment.selection_set.node, visiting, out)?;
                    visiting.remove(name);
                }
                Selection::InlineFragment(fragment) => {
                    let fragment = &fragment.node;
                    if !self.included(&fragment.directives)? {
                        continue;
                    }
                    self.collect(&fragment.selection_set.node, visiting, out)?;
                }
            }
        }
        Ok(())
    }

    /// Apply `@skip` and `@include`
    fn included(&self, directives: &[Positioned<Directive>]) -> Result<bool> {
        for directive in directives {
            let directive = &directive.node;
            let name = directive.name.node.as_str();
            if name != "skip" && name != "include" {
                continue;
            }
            let condition = directive
                .arguments
                .iter()
                .find(|(arg, _)| arg.node.as_str() == "if")
                .map(|(_, value)| value.node.clone().into_const_with(|n| self.variable(n)))
                .transpose()?;
            let condition = match condition {
                Some(async_graphql::Value::Boolean(b)) => b,
                _ => {
                    return Err(MovieGraphError::InvalidArgument(format!(
                        "@{} requires a Boolean 'if' argument",
                        name
                    )))
                }
            };
            if (name == "skip" && condition) || (name == "include" && !condition) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Bound value of a `$variable` reference
    fn variable(&self, name: async_graphql::Name) -> Result<async_graphql::Value> {
        let bound = self.variables.get(name.as_str()).cloned().ok_or_else(|| {
            MovieGraphError::InvalidArgument(format!("variable '${}' is not defined", name))
        })?;
        Ok(async_graphql::Value::from_json(bound)?)
    }
}

/// Fields with the same response key collapse into one and their
/// sub-selections merge. They must name the same field with the same arguments.
fn merge_field(out: &mut Vec<Field>, field: Field) -> Result<()> {
    let existing = match out
        .iter_mut()
        .find(|existing| existing.response_key() == field.response_key())
    {
        Some(existing) => existing,
        None => {
            out.push(field);
            return Ok(());
        }
    };
    if existing.name != field.name || existing.arguments != field.arguments {
        return Err(MovieGraphError::InvalidSelection(format!(
            "fields '{}' and '{}' conflict on response key '{}'",
            existing.name,
            field.name,
            field.response_key()
        )));
    }
    for child in field.selection {
        merge_field(&mut existing.selection, child)?;
    }
    Ok(())
}
