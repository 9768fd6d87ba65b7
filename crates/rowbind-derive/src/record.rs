//! Record derive macro implementation

use crate::common::syn_types::{box_inner, option_inner};
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

/// Parsed `#[record(...)]` field attribute.
#[derive(Default)]
struct FieldAttr {
    rename: Option<syn::LitStr>,
    skip: bool,
    nested: bool,
    embed: bool,
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        loop {
            if input.is_empty() {
                break;
            }

            let ident: syn::Ident = input.parse()?;
            if ident == "skip" {
                attr.skip = true;
            } else if ident == "nested" {
                attr.nested = true;
            } else if ident == "embed" {
                attr.embed = true;
            } else if ident == "rename" {
                let _: syn::Token![=] = input.parse()?;
                attr.rename = Some(input.parse()?);
            } else {
                return Err(syn::Error::new_spanned(
                    &ident,
                    "expected one of `rename`, `skip`, `nested`, `embed`",
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attr)
    }
}

fn field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        let parsed: FieldAttr = attr.parse_args()?;
        merged.skip |= parsed.skip;
        merged.nested |= parsed.nested;
        merged.embed |= parsed.embed;
        if parsed.rename.is_some() {
            merged.rename = parsed.rename;
        }
    }

    if merged.skip && (merged.nested || merged.embed || merged.rename.is_some()) {
        return Err(syn::Error::new_spanned(
            field,
            "`skip` cannot be combined with other record attributes",
        ));
    }
    if merged.nested && merged.embed {
        return Err(syn::Error::new_spanned(
            field,
            "use either `nested` or `embed`, not both",
        ));
    }
    Ok(merged)
}

/// How a sub-record field holds its record.
enum Holder<'a> {
    Plain(&'a syn::Type),
    Boxed(&'a syn::Type),
    Optional(&'a syn::Type),
    OptionalBoxed(&'a syn::Type),
}

impl<'a> Holder<'a> {
    fn of(ty: &'a syn::Type) -> Self {
        match option_inner(ty) {
            Some(inner) => match box_inner(inner) {
                Some(leaf) => Holder::OptionalBoxed(leaf),
                None => Holder::Optional(inner),
            },
            None => match box_inner(ty) {
                Some(leaf) => Holder::Boxed(leaf),
                None => Holder::Plain(ty),
            },
        }
    }

    fn record_type(&self) -> &'a syn::Type {
        match *self {
            Holder::Plain(t) | Holder::Boxed(t) | Holder::Optional(t) | Holder::OptionalBoxed(t) => {
                t
            }
        }
    }

    fn optional(&self) -> bool {
        matches!(self, Holder::Optional(_) | Holder::OptionalBoxed(_))
    }
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut defs = Vec::new();
    let mut reads = Vec::new();
    let mut writes = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let attr = field_attr(field)?;
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let declared = ident.unraw().to_string();
        let ty = &field.ty;

        if attr.skip {
            let type_name = quote!(#ty).to_string();
            defs.push(quote! {
                ::rowbind::FieldDef::scalar(#declared, #type_name).tag("-")
            });
            continue;
        }

        let tag = attr.rename.as_ref().map(|lit| quote!(.tag(#lit)));

        if attr.nested || attr.embed {
            let holder = Holder::of(ty);
            let inner = holder.record_type();
            let optional = holder.optional();
            let embedded = attr.embed.then(|| quote!(.embedded()));
            defs.push(quote! {
                ::rowbind::FieldDef::record(
                    #declared,
                    ::rowbind::RecordType::of::<#inner>(),
                    #optional,
                ) #tag #embedded
            });

            let (read, write) = match holder {
                Holder::Plain(_) => (
                    quote!(::rowbind::FieldRef::Record(&self.#ident)),
                    quote!(::rowbind::FieldMut::Record(&mut self.#ident)),
                ),
                Holder::Boxed(_) => (
                    quote!(::rowbind::FieldRef::Record(&*self.#ident)),
                    quote!(::rowbind::FieldMut::Record(&mut *self.#ident)),
                ),
                Holder::Optional(_) => (
                    quote! {
                        match &self.#ident {
                            ::std::option::Option::Some(v) => ::rowbind::FieldRef::Record(v),
                            ::std::option::Option::None => ::rowbind::FieldRef::Nil,
                        }
                    },
                    quote! {
                        ::rowbind::FieldMut::Record(
                            self.#ident.get_or_insert_with(::std::default::Default::default),
                        )
                    },
                ),
                Holder::OptionalBoxed(_) => (
                    quote! {
                        match &self.#ident {
                            ::std::option::Option::Some(v) => ::rowbind::FieldRef::Record(&**v),
                            ::std::option::Option::None => ::rowbind::FieldRef::Nil,
                        }
                    },
                    quote! {
                        ::rowbind::FieldMut::Record(
                            &mut **self.#ident.get_or_insert_with(::std::default::Default::default),
                        )
                    },
                ),
            };
            reads.push(quote!(#index => ::std::option::Option::Some(#read)));
            writes.push(quote!(#index => ::std::option::Option::Some(#write)));
            continue;
        }

        let type_name = quote!(#ty).to_string();
        defs.push(quote! {
            ::rowbind::FieldDef::scalar(#declared, #type_name) #tag
        });
        reads.push(quote! {
            #index => ::std::option::Option::Some(::rowbind::FieldRef::Scalar(&self.#ident))
        });
        writes.push(quote! {
            #index => ::std::option::Option::Some(::rowbind::FieldMut::Scalar(&mut self.#ident))
        });
    }

    Ok(quote! {
        impl #impl_generics ::rowbind::Record for #name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::rowbind::FieldDef> {
                ::std::vec![#(#defs),*]
            }

            fn record_type(&self) -> ::rowbind::RecordType {
                ::rowbind::RecordType::of::<Self>()
            }

            fn field(&self, index: usize) -> ::std::option::Option<::rowbind::FieldRef<'_>> {
                match index {
                    #(#reads,)*
                    _ => ::std::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::std::option::Option<::rowbind::FieldMut<'_>> {
                match index {
                    #(#writes,)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl #impl_generics ::rowbind::NamedArgs for #name #ty_generics #where_clause {
            fn named_source(&self) -> ::rowbind::NamedSource<'_> {
                ::rowbind::NamedSource::Record(self)
            }
        }
    })
}
