#[macro_use]
extern crate quote;
extern crate proc_macro;
extern crate syn;

use proc_macro2::TokenStream;
use syn::{
    parse_macro_input, spanned::Spanned, Attribute, Data, DeriveInput, Error, Expr, ExprLit,
    Fields, Ident, Lit, LitChar, Meta, Type,
};

/// Derives `InputMappingT` for an enum of input events.
///
/// Every unit variant is bound to a key: `#[key = 'q']` for a character,
/// `#[key = "KeyCode::Up"]` for any `KeyCode` expression, or, without the
/// attribute, the lowercased first letter of the variant name. `#[description = "..."]`
/// sets the text shown in navigation help. A variant with a single unnamed field
/// delegates to the mapping of the wrapped enum.
#[proc_macro_derive(InputMapping, attributes(key, description))]
pub fn derive_mapping(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match EnumInfo::from_derive_input(input) {
        Ok(info) => proc_macro::TokenStream::from(info.generate_impl()),
        Err(error) => proc_macro::TokenStream::from(error.to_compile_error()),
    }
}

struct EnumInfo {
    name: Ident,
    variants: Vec<VariantInfo>,
}

enum VariantInfo {
    Key {
        name: Ident,
        key: TokenStream,
        description: String,
    },
    Nested {
        name: Ident,
        ty: Type,
    },
}

impl EnumInfo {
    fn from_derive_input(input: DeriveInput) -> Result<Self, Error> {
        let Data::Enum(data) = input.data else {
            return Err(Error::new(
                input.ident.span(),
                "InputMapping can only be derived for enums",
            ));
        };

        let variants = data
            .variants
            .into_iter()
            .map(|variant| match variant.fields {
                Fields::Unit => {
                    let key = match parse_key(&variant.attrs)? {
                        Some(key) => key,
                        None => default_key(&variant.ident)?,
                    };
                    let description = parse_description(&variant.attrs)?.unwrap_or_default();

                    Ok(VariantInfo::Key {
                        name: variant.ident,
                        key,
                        description,
                    })
                }
                Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                    let ty = fields
                        .unnamed
                        .into_iter()
                        .next()
                        .map(|field| field.ty)
                        .ok_or_else(|| Error::new(variant.ident.span(), "Expected one field"))?;

                    Ok(VariantInfo::Nested {
                        name: variant.ident,
                        ty,
                    })
                }
                fields => Err(Error::new(
                    fields.span(),
                    "Expected a unit variant or a variant wrapping one nested input enum",
                )),
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self {
            name: input.ident,
            variants,
        })
    }

    fn generate_impl(&self) -> TokenStream {
        let name = &self.name;

        let (mapping_entries, key_matchers, nested_mappings, nested_matchers): (
            Vec<TokenStream>,
            Vec<TokenStream>,
            Vec<TokenStream>,
            Vec<TokenStream>,
        ) = itertools::multiunzip(self.variants.iter().map(|variant| {
            (
                variant.generate_mapping_entry(),
                variant.generate_key_matcher(),
                variant.generate_nested_mapping(),
                variant.generate_nested_matcher(),
            )
        }));

        quote! {
            impl ::input_mapping_common::InputMappingT for #name {
                fn get_mapping() -> ::input_mapping_common::InputMapping {
                    let mapping = ::input_mapping_common::InputMapping {
                        mapping: ::std::vec![ #(#mapping_entries)* ],
                    };

                    mapping #(#nested_mappings)*
                }

                #[allow(unused_variables)]
                fn map_event(event: ::ratatui::crossterm::event::Event) -> ::std::option::Option<Self> {
                    if let ::ratatui::crossterm::event::Event::Key(key_event) = &event {
                        if key_event.kind == ::ratatui::crossterm::event::KeyEventKind::Press {
                            #(#key_matchers)*
                        }
                    }

                    #(#nested_matchers)*

                    ::std::option::Option::None
                }
            }
        }
    }
}

impl VariantInfo {
    fn generate_mapping_entry(&self) -> TokenStream {
        match self {
            Self::Key {
                key, description, ..
            } => quote! {
                ::input_mapping_common::MappingEntry {
                    key: #key,
                    description: ::std::string::ToString::to_string(#description),
                },
            },
            Self::Nested { .. } => quote! {},
        }
    }

    fn generate_key_matcher(&self) -> TokenStream {
        match self {
            Self::Key { name, key, .. } => quote! {
                if key_event.code == #key {
                    return ::std::option::Option::Some(Self::#name);
                }
            },
            Self::Nested { .. } => quote! {},
        }
    }

    fn generate_nested_mapping(&self) -> TokenStream {
        match self {
            Self::Nested { ty, .. } => quote! {
                .merge(<#ty as ::input_mapping_common::InputMappingT>::get_mapping())
            },
            Self::Key { .. } => quote! {},
        }
    }

    fn generate_nested_matcher(&self) -> TokenStream {
        match self {
            Self::Nested { name, ty } => quote! {
                if let ::std::option::Option::Some(nested) =
                    <#ty as ::input_mapping_common::InputMappingT>::map_event(event.clone())
                {
                    return ::std::option::Option::Some(Self::#name(nested));
                }
            },
            Self::Key { .. } => quote! {},
        }
    }
}

fn parse_key(attrs: &[Attribute]) -> Result<Option<TokenStream>, Error> {
    let Some(value) = find_name_value(attrs, "key") else {
        return Ok(None);
    };

    match value {
        Expr::Lit(ExprLit {
            lit: Lit::Char(c), ..
        }) => Ok(Some(char_key(c))),
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => {
            let expr: Expr = s.parse()?;
            Ok(Some(quote! {
                {
                    #[allow(unused_imports)]
                    use ::ratatui::crossterm::event::KeyCode;
                    #expr
                }
            }))
        }
        other => Err(Error::new(
            other.span(),
            "Expected a char or a string with `KeyCode` expression",
        )),
    }
}

fn parse_description(attrs: &[Attribute]) -> Result<Option<String>, Error> {
    let Some(value) = find_name_value(attrs, "description") else {
        return Ok(None);
    };

    match value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(Some(s.value())),
        other => Err(Error::new(other.span(), "Expected a string description")),
    }
}

fn find_name_value<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Expr> {
    attrs.iter().find_map(|attr| match &attr.meta {
        Meta::NameValue(meta) if meta.path.is_ident(name) => Some(&meta.value),
        _ => None,
    })
}

fn default_key(ident: &Ident) -> Result<TokenStream, Error> {
    let first = ident
        .to_string()
        .chars()
        .next()
        .and_then(|c| c.to_lowercase().next())
        .ok_or_else(|| Error::new(ident.span(), "Empty variant name"))?;

    Ok(char_key(&LitChar::new(first, ident.span())))
}

fn char_key(c: &LitChar) -> TokenStream {
    quote! { ::ratatui::crossterm::event::KeyCode::Char(#c) }
}
