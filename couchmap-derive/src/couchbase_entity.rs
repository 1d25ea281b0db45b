use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{DataStruct, DeriveInput, Field, LitInt, LitStr, Result};

enum IndexDeclaration {
    Primary,
    Secondary(String),
    View { design: String, name: String },
}

#[derive(Default)]
struct FieldOptions {
    id: bool,
    version: bool,
    transient: bool,
    constructor: bool,
    storage_name: Option<String>,
}

fn field_options(field: &Field) -> Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in &field.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    options.id = true;
                    Ok(())
                } else if meta.path.is_ident("version") {
                    options.version = true;
                    Ok(())
                } else if meta.path.is_ident("transient") {
                    options.transient = true;
                    Ok(())
                } else if meta.path.is_ident("constructor") {
                    options.constructor = true;
                    Ok(())
                } else if meta.path.is_ident("field") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    options.storage_name = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("Unknown entity field attribute"))
                }
            })?;
        }
    }

    if options.transient && (options.id || options.version || options.constructor) {
        return Err(syn::Error::new_spanned(
            field,
            "a transient field cannot be an id, a version or a constructor argument",
        ));
    }
    Ok(options)
}

pub(crate) fn generate_entity_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut entity_name = name.to_string();
    let mut expiry: Option<u32> = None;
    let mut indexes = Vec::new();

    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    entity_name = s.value();
                    Ok(())
                } else if meta.path.is_ident("expiry") {
                    let value = meta.value()?;
                    let n: LitInt = value.parse()?;
                    expiry = Some(n.base10_parse()?);
                    Ok(())
                } else if meta.path.is_ident("n1ql_primary") {
                    indexes.push(IndexDeclaration::Primary);
                    Ok(())
                } else if meta.path.is_ident("n1ql_secondary") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    indexes.push(IndexDeclaration::Secondary(s.value()));
                    Ok(())
                } else if meta.path.is_ident("view") {
                    let mut design: Option<String> = None;
                    let mut view_name: Option<String> = None;
                    meta.parse_nested_meta(|meta| {
                        if meta.path.is_ident("design") {
                            let s: LitStr = meta.value()?.parse()?;
                            design = Some(s.value());
                            Ok(())
                        } else if meta.path.is_ident("name") {
                            let s: LitStr = meta.value()?.parse()?;
                            view_name = Some(s.value());
                            Ok(())
                        } else {
                            Err(meta.error("Unknown view attribute"))
                        }
                    })?;

                    match (design, view_name) {
                        (Some(design), Some(name)) => {
                            indexes.push(IndexDeclaration::View { design, name });
                            Ok(())
                        }
                        _ => Err(meta.error("View design and name are required")),
                    }
                } else {
                    Err(meta.error("Unknown entity attribute"))
                }
            })?;
        }
    }

    let fields: Vec<&Field> = match &data.fields {
        syn::Fields::Named(fields) => fields.named.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "only structs with named fields are supported",
            ))
        }
    };

    let mut properties = Vec::with_capacity(fields.len());
    let mut constructor_arguments = Vec::new();
    for field in fields {
        let options = field_options(field)?;
        if options.transient {
            continue;
        }

        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let property_name = ident.to_string();
        let ty = &field.ty;
        let type_name = ty.to_token_stream().to_string().replace(' ', "");

        let mut property = quote! {
            couchmap::mapping::PersistentProperty::new(
                #property_name,
                #type_name,
                |entity: &#name #ty_generics| couchmap::common::Convertible::to_value(&entity.#ident),
                |entity: &mut #name #ty_generics, value: &couchmap::common::Value| {
                    entity.#ident = if value.is_null() {
                        Default::default()
                    } else {
                        couchmap::common::from_value::<#ty>(value)?
                    };
                    Ok(())
                },
            )
        };
        if let Some(storage_name) = &options.storage_name {
            property = quote! { #property.field_name(#storage_name) };
        }
        if options.id {
            property = quote! { #property.id() };
        }
        if options.version {
            property = quote! { #property.version() };
        }
        if options.constructor {
            property = quote! { #property.constructor_argument() };
            constructor_arguments.push(quote! {
                #ident: args.argument::<#ty>(#property_name)?
            });
        }
        properties.push(property);
    }

    let expiry_code = expiry.map(|expiry| quote! { .expiry(#expiry) });

    let index_code: Vec<proc_macro2::TokenStream> = indexes
        .iter()
        .map(|index| match index {
            IndexDeclaration::Primary => quote! {
                .index(couchmap::index::EntityIndex::N1qlPrimary)
            },
            IndexDeclaration::Secondary(index_name) => quote! {
                .index(couchmap::index::EntityIndex::secondary(#index_name))
            },
            IndexDeclaration::View { design, name } => quote! {
                .index(couchmap::index::EntityIndex::view(#design, #name))
            },
        })
        .collect();

    // fields that are not constructor arguments start from Default and are
    // populated by their setters afterwards
    let instantiator_code = if constructor_arguments.is_empty() {
        None
    } else {
        Some(quote! {
            .instantiator(|args: &couchmap::mapping::ParameterValueProvider<'_, #name #ty_generics>| {
                Ok(#name {
                    #(#constructor_arguments,)*
                    ..Default::default()
                })
            })
        })
    };

    let gen = quote! {
        impl #impl_generics couchmap::mapping::MappedEntity for #name #ty_generics #where_clause {
            fn describe() -> couchmap::mapping::PersistentEntityBuilder<Self> {
                couchmap::mapping::PersistentEntityBuilder::new(#entity_name)
                    #(.property(#properties))*
                    #expiry_code
                    #(#index_code)*
                    #instantiator_code
            }
        }
    };

    Ok(TokenStream::from(gen))
}
