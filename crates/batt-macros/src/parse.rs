//! Parsing of `#[bind(...)]` attributes.

use proc_macro2::Span;
use std::collections::HashSet;
use syn::{spanned::Spanned, Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr, Path, Type};

/// A request source a field can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Query,
    Params,
    Json,
    Form,
}

impl Source {
    /// Every source, in binding order.
    pub const ALL: [Self; 4] = [Self::Query, Self::Params, Self::Json, Self::Form];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "query" => Some(Self::Query),
            "params" => Some(Self::Params),
            "json" => Some(Self::Json),
            "form" => Some(Self::Form),
            _ => None,
        }
    }

    /// The attribute key, e.g. `query`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Params => "params",
            Self::Json => "json",
            Self::Form => "form",
        }
    }

    /// The matching `BindSource` variant name.
    pub const fn variant(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Params => "Params",
            Self::Json => "Json",
            Self::Form => "Form",
        }
    }
}

/// One `source = "key"` pair on a field.
#[derive(Debug)]
pub struct BindTag {
    pub source: Source,
    pub key: String,
    pub span: Span,
}

/// A named field and its tags.
#[derive(Debug)]
pub struct BindField {
    pub ident: Ident,
    pub ty: Type,
    pub tags: Vec<BindTag>,
}

impl BindField {
    fn parse(field: Field) -> syn::Result<Self> {
        let span = field.span();
        let ident = field
            .ident
            .ok_or_else(|| syn::Error::new(span, "#[derive(Bind)] requires named fields"))?;

        let mut tags: Vec<BindTag> = Vec::new();
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("bind")) {
            attr.parse_nested_meta(|meta| {
                let name = meta
                    .path
                    .get_ident()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let source = Source::from_name(&name).ok_or_else(|| {
                    meta.error("unknown source, expected `query`, `params`, `json` or `form`")
                })?;

                let lit: LitStr = meta.value()?.parse()?;
                let key = lit.value();
                if key.is_empty() {
                    return Err(syn::Error::new(lit.span(), "binding key must not be empty"));
                }
                if tags.iter().any(|t| t.source == source) {
                    return Err(meta.error(format!("duplicate `{}` tag", source.name())));
                }

                tags.push(BindTag {
                    source,
                    key,
                    span: lit.span(),
                });
                Ok(())
            })?;
        }

        Ok(Self {
            ident,
            ty: field.ty,
            tags,
        })
    }

    /// Returns the key this field is bound to in `source`.
    pub fn key(&self, source: Source) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.source == source)
            .map(|t| t.key.as_str())
    }
}

/// Container-level options.
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    /// Path to the `batt_extract` crate.
    pub krate: Option<Path>,
    /// The type implements `Validate` itself.
    pub user_validate: bool,
}

impl ContainerAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("bind")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("crate") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.krate = Some(lit.parse()?);
                    Ok(())
                } else if meta.path.is_ident("validate") {
                    out.user_validate = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown attribute, expected `crate` or `validate`"))
                }
            })?;
        }
        Ok(out)
    }
}

/// A parsed `#[derive(Bind)]` input.
#[derive(Debug)]
pub struct BindInput {
    pub ident: Ident,
    pub attrs: ContainerAttrs,
    pub fields: Vec<BindField>,
}

impl BindInput {
    /// Parses and checks a derive input.
    pub fn from_derive(input: DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new(
                input.generics.span(),
                "#[derive(Bind)] does not support generic types",
            ));
        }

        let attrs = ContainerAttrs::parse(&input.attrs)?;

        let fields = match input.data {
            Data::Struct(data) => match data.fields {
                Fields::Named(named) => named
                    .named
                    .into_iter()
                    .map(BindField::parse)
                    .collect::<syn::Result<Vec<_>>>()?,
                Fields::Unit => Vec::new(),
                Fields::Unnamed(unnamed) => {
                    return Err(syn::Error::new(
                        unnamed.span(),
                        "#[derive(Bind)] requires named fields",
                    ))
                }
            },
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span,
                    "#[derive(Bind)] only supports structs",
                ))
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span,
                    "#[derive(Bind)] only supports structs",
                ))
            }
        };

        check_unique_keys(&fields)?;

        Ok(Self {
            ident: input.ident,
            attrs,
            fields,
        })
    }
}

fn check_unique_keys(fields: &[BindField]) -> syn::Result<()> {
    for source in Source::ALL {
        let mut seen = HashSet::new();
        for tag in fields
            .iter()
            .flat_map(|f| &f.tags)
            .filter(|t| t.source == source)
        {
            if !seen.insert(tag.key.as_str()) {
                return Err(syn::Error::new(
                    tag.span,
                    format!(
                        "`{}` key \"{}\" is bound to more than one field",
                        source.name(),
                        tag.key
                    ),
                ));
            }
        }
    }
    Ok(())
}
