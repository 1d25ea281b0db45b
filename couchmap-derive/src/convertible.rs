use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::quote;
use syn::{DataEnum, DataStruct, DeriveInput, Field, LitStr, Result, Type};

fn ignored_fields(ast: &DeriveInput) -> Result<Vec<String>> {
    let mut ignored_fields: Vec<String> = vec![];
    for attr in &ast.attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignored") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    ignored_fields.extend(s.value().split(',').map(|f| f.trim().to_string()));
                    Ok(())
                } else {
                    Err(meta.error("Unknown converter attribute"))
                }
            })?;
        }
    }
    Ok(ignored_fields)
}

pub(crate) fn generate_convertible_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let ignored_fields = ignored_fields(ast)?;

    let fields: Vec<&Field> = match &data.fields {
        syn::Fields::Named(fields) => fields.named.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "only structs with named fields are supported",
            ))
        }
    };

    let stored_idents: Vec<&Ident> = fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .filter(|ident| !ignored_fields.contains(&ident.to_string()))
        .collect();
    let stored_names: Vec<String> = stored_idents.iter().map(|i| i.to_string()).collect();

    // ignored fields come back as their default, missing ones as null
    let initializers: Vec<proc_macro2::TokenStream> = fields
        .iter()
        .filter_map(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)))
        .map(|(ident, ty)| {
            let name = ident.to_string();
            if ignored_fields.contains(&name) {
                quote! { #ident: Default::default() }
            } else {
                quote! {
                    #ident: couchmap::common::from_value::<#ty>(
                        doc.get(#name).unwrap_or(&couchmap::common::Value::Null),
                    )?
                }
            }
        })
        .collect();

    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics couchmap::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> couchmap::errors::CouchmapResult<couchmap::common::Value> {
                let mut doc = couchmap::document::Document::new();
                #(doc.put(#stored_names, couchmap::common::Convertible::to_value(&self.#stored_idents)?);)*
                Ok(couchmap::common::Value::Document(doc))
            }

            fn from_value(value: &couchmap::common::Value) -> couchmap::errors::CouchmapResult<Self::Output> {
                match value {
                    couchmap::common::Value::Document(doc) => Ok(#name {
                        #(#initializers,)*
                    }),
                    _ => Err(couchmap::errors::CouchmapError::new(
                        &format!("Value of type {} is not a {}", value.type_name(), #type_name),
                        couchmap::errors::ErrorKind::ObjectMappingError,
                    )),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}

pub(crate) fn generate_convertible_for_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let ignored_fields = ignored_fields(ast)?;

    let mut to_value_variants = Vec::with_capacity(data.variants.len());
    let mut from_value_variants = Vec::with_capacity(data.variants.len());

    for variant in &data.variants {
        let variant_ident = &variant.ident;
        let variant_name = variant_ident.to_string();

        match &variant.fields {
            syn::Fields::Named(fields) => {
                let stored_idents: Vec<&Ident> = fields
                    .named
                    .iter()
                    .filter_map(|f| f.ident.as_ref())
                    .filter(|ident| !ignored_fields.contains(&ident.to_string()))
                    .collect();
                let stored_names: Vec<String> = stored_idents.iter().map(|i| i.to_string()).collect();

                to_value_variants.push(quote! {
                    #name::#variant_ident { #(#stored_idents,)* .. } => {
                        let mut data = couchmap::document::Document::new();
                        #(data.put(#stored_names, couchmap::common::Convertible::to_value(#stored_idents)?);)*
                        let mut doc = couchmap::document::Document::new();
                        doc.put("variant", #variant_name);
                        doc.put("value", couchmap::common::Value::Document(data));
                        Ok(couchmap::common::Value::Document(doc))
                    }
                });

                let initializers: Vec<proc_macro2::TokenStream> = fields
                    .named
                    .iter()
                    .filter_map(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)))
                    .map(|(ident, ty)| {
                        let field_name = ident.to_string();
                        if ignored_fields.contains(&field_name) {
                            quote! { #ident: Default::default() }
                        } else {
                            quote! {
                                #ident: couchmap::common::from_value::<#ty>(
                                    data.get(#field_name).unwrap_or(&couchmap::common::Value::Null),
                                )?
                            }
                        }
                    })
                    .collect();

                from_value_variants.push(quote! {
                    #variant_name => {
                        let data = payload.as_document().ok_or_else(|| {
                            couchmap::errors::CouchmapError::new(
                                &format!("Payload of {}::{} is not a document", #type_name, #variant_name),
                                couchmap::errors::ErrorKind::ObjectMappingError,
                            )
                        })?;
                        Ok(#name::#variant_ident {
                            #(#initializers,)*
                        })
                    }
                });
            }
            syn::Fields::Unnamed(fields) => {
                let field_count = fields.unnamed.len();
                let field_idents: Vec<Ident> = (0..field_count)
                    .map(|i| Ident::new(&format!("field_{}", i), Span::call_site()))
                    .collect();
                let field_types: Vec<&Type> = fields.unnamed.iter().map(|f| &f.ty).collect();
                let field_indices: Vec<usize> = (0..field_count).collect();

                to_value_variants.push(quote! {
                    #name::#variant_ident(#(#field_idents),*) => {
                        let mut array = Vec::with_capacity(#field_count);
                        #(array.push(couchmap::common::Convertible::to_value(#field_idents)?);)*
                        let mut doc = couchmap::document::Document::new();
                        doc.put("variant", #variant_name);
                        doc.put("value", couchmap::common::Value::Array(array));
                        Ok(couchmap::common::Value::Document(doc))
                    }
                });

                from_value_variants.push(quote! {
                    #variant_name => {
                        let data = payload
                            .as_array()
                            .filter(|data| data.len() == #field_count)
                            .ok_or_else(|| {
                                couchmap::errors::CouchmapError::new(
                                    &format!(
                                        "Payload of {}::{} is not an array of {} values",
                                        #type_name, #variant_name, #field_count
                                    ),
                                    couchmap::errors::ErrorKind::ObjectMappingError,
                                )
                            })?;
                        Ok(#name::#variant_ident(
                            #(couchmap::common::from_value::<#field_types>(&data[#field_indices])?,)*
                        ))
                    }
                });
            }
            syn::Fields::Unit => {
                to_value_variants.push(quote! {
                    #name::#variant_ident => {
                        let mut doc = couchmap::document::Document::new();
                        doc.put("variant", #variant_name);
                        doc.put("value", couchmap::common::Value::Null);
                        Ok(couchmap::common::Value::Document(doc))
                    }
                });

                from_value_variants.push(quote! {
                    #variant_name => Ok(#name::#variant_ident)
                });
            }
        }
    }

    let gen = quote! {
        impl #impl_generics couchmap::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> couchmap::errors::CouchmapResult<couchmap::common::Value> {
                match self {
                    #(#to_value_variants),*
                }
            }

            fn from_value(value: &couchmap::common::Value) -> couchmap::errors::CouchmapResult<Self::Output> {
                let invalid = || {
                    couchmap::errors::CouchmapError::new(
                        &format!("Value is not a valid {} variant", #type_name),
                        couchmap::errors::ErrorKind::ObjectMappingError,
                    )
                };

                let doc = value.as_document().ok_or_else(invalid)?;
                let variant = doc.get("variant").and_then(|v| v.as_str()).ok_or_else(invalid)?;
                let payload = doc.get("value").unwrap_or(&couchmap::common::Value::Null);
                match variant {
                    #(#from_value_variants,)*
                    _ => Err(invalid()),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}
