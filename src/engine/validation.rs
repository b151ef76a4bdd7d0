// Request validation against the schema
// Runs before any resolver so a malformed request never touches the store

use serde_json::Value;
use std::collections::HashSet;

use crate::engine::executor::{ErrorDescriptor, PathSegment};
use crate::engine::schema::{Schema, TypeKind, TypeRef};
use crate::engine::selection::{Field, OperationKind, Request};
use crate::ErrorKind;

/// Check every field, selection shape and argument of `request`.
/// All problems are reported, not just the first.
pub fn validate(schema: &Schema, request: &Request) -> Result<(), Vec<ErrorDescriptor>> {
    let root = match request.operation {
        OperationKind::Query => Some(schema.query_type()),
        OperationKind::Mutation => schema.mutation_type(),
    };
    let root = match root {
        Some(root) => root,
        None => {
            return Err(vec![ErrorDescriptor::new(
                ErrorKind::InvalidSelection,
                format!("schema does not support {} operations", request.operation),
            )])
        }
    };

    let mut errors = Vec::new();
    if request.selection.is_empty() {
        errors.push(ErrorDescriptor::new(
            ErrorKind::InvalidSelection,
            "operation selects no fields",
        ));
    }
    validate_selection(schema, root, &request.selection, &[], &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_selection(
    schema: &Schema,
    type_name: &str,
    fields: &[Field],
    path: &[PathSegment],
    errors: &mut Vec<ErrorDescriptor>,
) {
    let mut keys = HashSet::new();
    for field in fields {
        let mut field_path = path.to_vec();
        field_path.push(PathSegment::Field(field.response_key().to_string()));
        let selection_error = |message: String| {
            ErrorDescriptor::new(ErrorKind::InvalidSelection, message).with_path(field_path.clone())
        };

        // Documents merge repeated keys while lowering; a built request must not repeat one
        if !keys.insert(field.response_key()) {
            errors.push(selection_error(format!(
                "Response key '{}' is selected more than once",
                field.response_key()
            )));
            continue;
        }

        if field.name == "__typename" {
            if !field.selection.is_empty() || !field.arguments.is_empty() {
                errors.push(selection_error(
                    "__typename takes no arguments or sub-selection".to_string(),
                ));
            }
            continue;
        }

        let definition = match schema.field(type_name, &field.name) {
            Some(definition) => definition,
            None => {
                errors.push(selection_error(format!(
                    "Cannot query field '{}' on type '{}'",
                    field.name, type_name
                )));
                continue;
            }
        };

        let output = definition.ty.base_name();
        match schema.kind(output) {
            Some(TypeKind::Object(_)) => {
                if field.selection.is_empty() {
                    errors.push(selection_error(format!(
                        "Field '{}' of type '{}' must have a selection of subfields",
                        field.name, definition.ty
                    )));
                } else {
                    validate_selection(schema, output, &field.selection, &field_path, errors);
                }
            }
            _ => {
                if !field.selection.is_empty() {
                    errors.push(selection_error(format!(
                        "Field '{}' of type '{}' cannot have a selection",
                        field.name, definition.ty
                    )));
                }
            }
        }

        for name in field.arguments.names() {
            if !definition.arguments.contains_key(name) {
                errors.push(
                    ErrorDescriptor::new(
                        ErrorKind::InvalidArgument,
                        format!("Unknown argument '{}' on field '{}.{}'", name, type_name, field.name),
                    )
                    .with_path(field_path.clone()),
                );
            }
        }

        for argument in definition.arguments.values() {
            let value = field.arguments.get(&argument.name);
            let problem = match value {
                None if argument.is_required() => Some(format!(
                    "Field '{}' argument '{}' of type '{}' is required",
                    field.name, argument.name, argument.ty
                )),
                None => None,
                Some(value) => check_input(schema, &argument.ty, value)
                    .err()
                    .map(|reason| format!("Argument '{}' {}", argument.name, reason)),
            };
            if let Some(message) = problem {
                errors.push(
                    ErrorDescriptor::new(ErrorKind::InvalidArgument, message)
                        .with_path(field_path.clone()),
                );
            }
        }
    }
}

/// Structural check of an input value. Lists accept a single item; ids
/// accept strings and integers.
fn check_input(schema: &Schema, ty: &TypeRef, value: &Value) -> Result<(), String> {
    match ty {
        TypeRef::NonNull(inner) => {
            if value.is_null() {
                return Err(format!("must not be null for type '{}'", ty));
            }
            check_input(schema, inner, value)
        }
        _ if value.is_null() => Ok(()),
        TypeRef::List(item) => match value {
            Value::Array(items) => items.iter().try_for_each(|v| check_input(schema, item, v)),
            single => check_input(schema, item, single),
        },
        TypeRef::Named(name) => match schema.kind(name) {
            Some(TypeKind::Scalar) => {
                let ok = match name.as_str() {
                    "ID" => value.is_string() || value.is_i64() || value.is_u64(),
                    "String" => value.is_string(),
                    "Boolean" => value.is_boolean(),
                    "Int" => value.is_i64(),
                    _ => true,
                };
                if ok {
                    Ok(())
                } else {
                    Err(format!("has invalid value {} for type '{}'", value, name))
                }
            }
            Some(TypeKind::InputObject(input)) => {
                let object = value
                    .as_object()
                    .ok_or_else(|| format!("expects an object of type '{}'", name))?;
                for key in object.keys() {
                    if !input.fields.contains_key(key) {
                        return Err(format!("has unknown field '{}' for type '{}'", key, name));
                    }
                }
                for (key, field_ty) in &input.fields {
                    let field_value = object.get(key).unwrap_or(&Value::Null);
                    check_input(schema, field_ty, field_value)
                        .map_err(|reason| format!("field '{}': {}", key, reason))?;
                }
                Ok(())
            }
            _ => Err(format!("uses non-input type '{}'", name)),
        },
    }
}
