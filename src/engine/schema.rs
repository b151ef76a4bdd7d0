// Schema model for the resolution engine
// Types, fields, arguments and the canonical movie-graph schema

//! # Schema
//!
//! The executor is schema-driven: a field's declared [`TypeRef`] decides how a
//! resolved value is completed (scalar coercion, list fan-out, nested
//! selection) and where a null for a non-nullable field bubbles to.
//!
//! Types are written in GraphQL notation and parsed with [`TypeRef::from_str`]:
//!
//! ```rust
//! # use movie_graph::TypeRef;
//! let ty: TypeRef = "[Tag!]!".parse().unwrap();
//! assert!(ty.is_non_null());
//! assert_eq!(ty.to_string(), "[Tag!]!");
//! ```

use indexmap::IndexMap;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::{MovieGraphError, Result};

pub const BUILTIN_SCALARS: [&str; 4] = ["ID", "String", "Boolean", "Int"];

/// Reference to a type, possibly wrapped in list / non-null modifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named<S: Into<String>>(name: S) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn non_null(self) -> Self {
        match self {
            TypeRef::NonNull(_) => self,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

impl FromStr for TypeRef {
    type Err = MovieGraphError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || MovieGraphError::Internal(format!("invalid type reference '{}'", s));

        if let Some(inner) = s.strip_suffix('!') {
            let inner: TypeRef = inner.parse()?;
            if inner.is_non_null() {
                return Err(invalid());
            }
            return Ok(inner.non_null());
        }
        if let Some(inner) = s.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(invalid)?;
            return Ok(TypeRef::list(inner.parse()?));
        }
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid());
        }
        Ok(TypeRef::named(s))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDefinition {
    pub name: String,
    pub ty: TypeRef,
}

impl ArgumentDefinition {
    /// Non-null arguments must be supplied
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub arguments: IndexMap<String, ArgumentDefinition>,
    pub description: Option<String>,
}

impl FieldDefinition {
    /// `ty` uses GraphQL notation; an unparsable type is a programming error
    /// reported by [`SchemaBuilder::build`]
    pub fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty
                .parse()
                .unwrap_or_else(|_| TypeRef::named(format!("<invalid {}>", ty))),
            arguments: IndexMap::new(),
            description: None,
        }
    }

    pub fn argument(mut self, name: &str, ty: &str) -> Self {
        let ty = ty
            .parse()
            .unwrap_or_else(|_| TypeRef::named(format!("<invalid {}>", ty)));
        self.arguments.insert(
            name.to_string(),
            ArgumentDefinition {
                name: name.to_string(),
                ty,
            },
        );
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub name: String,
    pub fields: IndexMap<String, FieldDefinition>,
}

impl ObjectType {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputObjectType {
    pub name: String,
    pub fields: IndexMap<String, TypeRef>,
}

impl InputObjectType {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, name: &str, ty: &str) -> Self {
        let ty = ty
            .parse()
            .unwrap_or_else(|_| TypeRef::named(format!("<invalid {}>", ty)));
        self.fields.insert(name.to_string(), ty);
        self
    }
}

/// What a named type resolves to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeKind<'a> {
    Scalar,
    Object(&'a ObjectType),
    InputObject(&'a InputObjectType),
}

#[derive(Debug, Clone)]
pub struct Schema {
    query_type: String,
    mutation_type: Option<String>,
    scalars: Vec<String>,
    objects: IndexMap<String, ObjectType>,
    inputs: IndexMap<String, InputObjectType>,
}

impl Schema {
    pub fn builder(query_type: &str) -> SchemaBuilder {
        SchemaBuilder::new(query_type)
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn is_mutation_root(&self, type_name: &str) -> bool {
        self.mutation_type.as_deref() == Some(type_name)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.objects.get(name)
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        self.objects.get(type_name)?.fields.get(field_name)
    }

    pub fn kind(&self, name: &str) -> Option<TypeKind<'_>> {
        if self.scalars.iter().any(|s| s == name) {
            return Some(TypeKind::Scalar);
        }
        if let Some(object) = self.objects.get(name) {
            return Some(TypeKind::Object(object));
        }
        self.inputs.get(name).map(TypeKind::InputObject)
    }

    /// Render the schema in GraphQL SDL
    pub fn to_sdl(&self) -> String {
        let mut out = String::new();
        for scalar in &self.scalars {
            let _ = writeln!(out, "scalar {}", scalar);
        }
        for input in self.inputs.values() {
            let _ = writeln!(out, "\ninput {} {{", input.name);
            for (name, ty) in &input.fields {
                let _ = writeln!(out, "  {}: {}", name, ty);
            }
            out.push_str("}\n");
        }
        for object in self.objects.values() {
            let _ = writeln!(out, "\ntype {} {{", object.name);
            for field in object.fields.values() {
                if let Some(description) = &field.description {
                    let _ = writeln!(out, "  \"{}\"", description);
                }
                let _ = write!(out, "  {}", field.name);
                if !field.arguments.is_empty() {
                    let args: Vec<String> = field
                        .arguments
                        .values()
                        .map(|a| format!("{}: {}", a.name, a.ty))
                        .collect();
                    let _ = write!(out, "({})", args.join(", "));
                }
                let _ = writeln!(out, ": {}", field.ty);
            }
            out.push_str("}\n");
        }
        out
    }
}

pub struct SchemaBuilder {
    query_type: String,
    mutation_type: Option<String>,
    scalars: Vec<String>,
    objects: IndexMap<String, ObjectType>,
    inputs: IndexMap<String, InputObjectType>,
}

impl SchemaBuilder {
    pub fn new(query_type: &str) -> Self {
        Self {
            query_type: query_type.to_string(),
            mutation_type: None,
            scalars: BUILTIN_SCALARS.iter().map(|s| s.to_string()).collect(),
            objects: IndexMap::new(),
            inputs: IndexMap::new(),
        }
    }

    pub fn mutation(mut self, mutation_type: &str) -> Self {
        self.mutation_type = Some(mutation_type.to_string());
        self
    }

    pub fn object(mut self, object: ObjectType) -> Self {
        self.objects.insert(object.name.clone(), object);
        self
    }

    pub fn input(mut self, input: InputObjectType) -> Self {
        self.inputs.insert(input.name.clone(), input);
        self
    }

    /// Check that every referenced type exists and lands in the right position
    /// (objects as field outputs, scalars/inputs as arguments)
    pub fn build(self) -> Result<Schema> {
        let schema = Schema {
            query_type: self.query_type,
            mutation_type: self.mutation_type,
            scalars: self.scalars,
            objects: self.objects,
            inputs: self.inputs,
        };

        let mut roots = vec![schema.query_type.as_str()];
        roots.extend(schema.mutation_type.as_deref());
        for root in roots {
            if schema.object(root).is_none() {
                return Err(MovieGraphError::Internal(format!(
                    "root type '{}' is not defined",
                    root
                )));
            }
        }

        for object in schema.objects.values() {
            for field in object.fields.values() {
                match schema.kind(field.ty.base_name()) {
                    Some(TypeKind::Scalar) | Some(TypeKind::Object(_)) => {}
                    _ => {
                        return Err(MovieGraphError::Internal(format!(
                            "field {}.{} has unknown output type {}",
                            object.name, field.name, field.ty
                        )))
                    }
                }
                for arg in field.arguments.values() {
                    match schema.kind(arg.ty.base_name()) {
                        Some(TypeKind::Scalar) | Some(TypeKind::InputObject(_)) => {}
                        _ => {
                            return Err(MovieGraphError::Internal(format!(
                                "argument {}.{}({}) has unknown input type {}",
                                object.name, field.name, arg.name, arg.ty
                            )))
                        }
                    }
                }
            }
        }

        for input in schema.inputs.values() {
            for (name, ty) in &input.fields {
                match schema.kind(ty.base_name()) {
                    Some(TypeKind::Scalar) | Some(TypeKind::InputObject(_)) => {}
                    _ => {
                        return Err(MovieGraphError::Internal(format!(
                            "input field {}.{} has unknown type {}",
                            input.name, name, ty
                        )))
                    }
                }
            }
        }

        Ok(schema)
    }
}

/// The canonical movie-graph schema
pub fn movie_schema() -> Result<Schema> {
    Schema::builder("Query")
        .mutation("Mutation")
        .input(
            InputObjectType::new("ArtworkFilter")
                .field("languages", "[String!]")
                .field("types", "[String!]"),
        )
        .object(
            ObjectType::new("Query")
                .field(
                    FieldDefinition::new("movies", "[Movie!]!")
                        .argument("movieIds", "[ID!]")
                        .argument("filters", "ArtworkFilter")
                        .description("Movies in store order, or the listed ids in request order"),
                )
                .field(FieldDefinition::new("movie", "Movie").argument("movieId", "ID!"))
                .field(FieldDefinition::new("tags", "[Tag!]!"))
                .field(FieldDefinition::new("tag", "Tag").argument("tagId", "ID!"))
                .field(
                    FieldDefinition::new("requestDetails", "RequestDetails!")
                        .description("Fresh per-request identifier"),
                ),
        )
        .object(
            ObjectType::new("Mutation")
                .field(FieldDefinition::new("deleteMovie", "Boolean!").argument("movieId", "ID!"))
                .field(
                    FieldDefinition::new("addTagsToMovie", "Movie!")
                        .argument("movieId", "ID!")
                        .argument("tagIds", "[ID!]!"),
                )
                .field(
                    FieldDefinition::new("removeTagsFromMovie", "Movie!")
                        .argument("movieId", "ID!")
                        .argument("tagIds", "[ID!]!"),
                ),
        )
        .object(
            ObjectType::new("Movie")
                .field(FieldDefinition::new("id", "ID!"))
                .field(FieldDefinition::new("movieId", "ID!"))
                .field(FieldDefinition::new("title", "String!"))
                .field(FieldDefinition::new("internalTitle", "String!"))
                .field(FieldDefinition::new("tags", "[Tag!]!"))
                .field(FieldDefinition::new("artworks", "[Artwork!]!").argument("filters", "ArtworkFilter"))
                .field(FieldDefinition::new("details", "DetailsWrapper")),
        )
        .object(
            ObjectType::new("Tag")
                .field(FieldDefinition::new("id", "ID!"))
                .field(FieldDefinition::new("name", "String!")),
        )
        .object(
            ObjectType::new("Artwork")
                .field(FieldDefinition::new("id", "ID!"))
                .field(FieldDefinition::new("name", "String!"))
                .field(FieldDefinition::new("language", "String!"))
                .field(FieldDefinition::new("type", "String!")),
        )
        .object(
            ObjectType::new("DetailsWrapper")
                .field(FieldDefinition::new("description", "String!"))
                .field(FieldDefinition::new("details", "Details!")),
        )
        .object(
            ObjectType::new("Details")
                .field(FieldDefinition::new("id", "ID!"))
                .field(FieldDefinition::new("tags", "[Tag!]!")),
        )
        .object(ObjectType::new("RequestDetails").field(FieldDefinition::new("id", "ID!")))
        .build()
}
