use proc_macro::TokenStream;
use quote::quote;

use syn::parse::ParseStream;
use syn::spanned::Spanned as _;
use syn::{
    Attribute, Data, DeriveInput, Error, FnArg, GenericArgument, Ident, ImplItem, ItemImpl, Pat,
    PathArguments, Token, Type,
};

const EXPORT_ATTR: &str = "export";
const IMPORT_ATTR: &str = "import";
const INJECT_ATTR: &str = "inject";
const INJECTABLE_ATTR: &str = "injectable";
const CONSTRUCTOR_ATTR: &str = "constructor";

fn extract_generic_type(ty: &Type, wrapper: &str) -> Option<Type> {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
        && segment.ident == wrapper
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(GenericArgument::Type(inner)) = args.args.first()
    {
        return Some(inner.clone());
    }
    None
}

fn has_attr(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

fn is_self_type(ty: &Type, name: &Ident) -> bool {
    matches!(ty, Type::Path(type_path)
        if type_path.qself.is_none()
            && (type_path.path.is_ident("Self") || type_path.path.is_ident(name)))
}

struct ExportArgs {
    contract: Type,
    policy: Ident,
}

fn parse_export(attr: &Attribute) -> syn::Result<ExportArgs> {
    attr.parse_args_with(|input: ParseStream| {
        let contract: Type = input.parse()?;
        let policy = if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            let policy: Ident = input.parse()?;
            if policy != "Shared" && policy != "NonShared" {
                return Err(Error::new(
                    policy.span(),
                    "Creation policy must be Shared or NonShared",
                ));
            }
            policy
        } else {
            Ident::new("Shared", proc_macro2::Span::call_site())
        };
        Ok(ExportArgs { contract, policy })
    })
}

#[derive(Default)]
struct InjectableArgs {
    notify: bool,
    constructors: bool,
}

fn parse_injectable(attrs: &[Attribute]) -> syn::Result<InjectableArgs> {
    let mut args = InjectableArgs::default();
    for attr in attrs {
        if !attr.path().is_ident(INJECTABLE_ATTR) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("notify") {
                args.notify = true;
                Ok(())
            } else if meta.path.is_ident("constructors") {
                args.constructors = true;
                Ok(())
            } else {
                Err(meta.error(format!("Unsupported #[{INJECTABLE_ATTR}] option")))
            }
        })?;
    }
    Ok(args)
}

fn is_default_field(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut default = false;
    for attr in attrs {
        if !attr.path().is_ident(INJECT_ATTR) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                default = true;
                Ok(())
            } else {
                Err(meta.error(format!("Unsupported #[{INJECT_ATTR}] option")))
            }
        })?;
    }
    Ok(default)
}

/// Derive macro for the Injectable trait
#[proc_macro_derive(Injectable, attributes(export, import, inject, injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    handle_derive_injectable(input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Attribute macro for impl blocks with constructor methods
#[proc_macro_attribute]
pub fn constructors(_attr: TokenStream, item: TokenStream) -> TokenStream {
    if let Ok(item_impl) = syn::parse::<ItemImpl>(item) {
        return handle_constructors_impl(item_impl)
            .unwrap_or_else(Error::into_compile_error)
            .into();
    }
    TokenStream::from(
        Error::new(
            proc_macro2::Span::call_site(),
            "#[constructors] can only be applied to impl blocks",
        )
        .to_compile_error(),
    )
}

fn handle_derive_injectable(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Generic types are not supported",
        ));
    }
    let fields = match &input.data {
        Data::Struct(s) => &s.fields,
        _ => return Err(Error::new(name.span(), "Only structs are supported")),
    };

    let options = parse_injectable(&input.attrs)?;

    let mut export_stmt = quote! {};
    let mut implements_impl = quote! {};
    for attr in &input.attrs {
        if !attr.path().is_ident(EXPORT_ATTR) {
            continue;
        }
        if !export_stmt.is_empty() {
            return Err(Error::new(attr.span(), "Only one export declaration allowed"));
        }
        let ExportArgs { contract, policy } = parse_export(attr)?;
        export_stmt = quote! {
            .export(::phoenix::Export::new::<#contract, Self>(::phoenix::CreationPolicy::#policy))
        };
        if !is_self_type(&contract, name) {
            implements_impl = quote! {
                impl ::phoenix::Implements<#contract> for #name {
                    fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<#contract> {
                        self
                    }
                }
            };
        }
    }

    let mut param_lets = Vec::new();
    let mut param_stmts = Vec::new();
    let mut field_inits = Vec::new();
    let mut import_stmts = Vec::new();

    match fields {
        syn::Fields::Named(fields) => {
            for field in &fields.named {
                let field_ident = field.ident.as_ref().unwrap();
                let field_name = field_ident.to_string();
                let field_ty = &field.ty;

                if has_attr(&field.attrs, IMPORT_ATTR) {
                    let Some(contract) = extract_generic_type(field_ty, "Import") else {
                        return Err(Error::new(
                            field_ty.span(),
                            format!("#[{IMPORT_ATTR}] fields must be of type Import<T>"),
                        ));
                    };
                    import_stmts.push(quote! {
                        .import::<#contract>(#field_name, |this| &this.#field_ident)
                    });
                    field_inits.push(quote! { #field_ident: ::phoenix::Import::new() });
                } else if is_default_field(&field.attrs)? {
                    field_inits.push(quote! {
                        #field_ident: ::std::default::Default::default()
                    });
                } else if let Some(contract) = extract_generic_type(field_ty, "Arc") {
                    param_lets.push(quote! {
                        let #field_ident = args.next::<#contract>()?;
                    });
                    param_stmts.push(quote! {
                        .param::<#contract>(#field_name)
                    });
                    field_inits.push(quote! { #field_ident });
                } else if !options.constructors {
                    return Err(Error::new(
                        field_ty.span(),
                        format!(
                            "Dependencies must be of type Arc<T>, or use #[{IMPORT_ATTR}] or #[{INJECT_ATTR}(default)]"
                        ),
                    ));
                }
            }
        }
        syn::Fields::Unnamed(_) => {
            return Err(Error::new(name.span(), "Tuple structs are not supported"));
        }
        syn::Fields::Unit => {}
    }

    let constructor_stmt = if options.constructors {
        quote! {
            .constructors(<Self as ::phoenix::Constructors>::constructors())
        }
    } else {
        let args = if param_lets.is_empty() {
            quote! { _ }
        } else {
            quote! { args }
        };
        quote! {
            .constructor(
                ::phoenix::ConstructorDescriptor::new(|#args| {
                    #(#param_lets)*
                    ::std::result::Result::Ok(Self {
                        #(#field_inits,)*
                    })
                })
                #(#param_stmts)*
            )
        }
    };

    let notify_stmt = if options.notify {
        quote! { .notify_imports_completed() }
    } else {
        quote! {}
    };

    Ok(quote! {
        impl ::phoenix::Injectable for #name {
            fn descriptor() -> ::phoenix::TypeDescriptor {
                ::phoenix::TypeDescriptor::builder::<Self>()
                    #export_stmt
                    #constructor_stmt
                    #(#import_stmts)*
                    #notify_stmt
                    .build()
            }
        }

        #implements_impl
    })
}

fn parse_constructor_attr(attrs: &[Attribute]) -> syn::Result<Option<bool>> {
    let mut constructor = None;
    for attr in attrs {
        if !attr.path().is_ident(CONSTRUCTOR_ATTR) {
            continue;
        }
        if constructor.is_some() {
            return Err(Error::new(attr.span(), "Duplicate #[constructor] attribute"));
        }
        let mut preferred = false;
        if let syn::Meta::List(_) = &attr.meta {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("preferred") {
                    preferred = true;
                    Ok(())
                } else {
                    Err(meta.error(format!("Unsupported #[{CONSTRUCTOR_ATTR}] option")))
                }
            })?;
        }
        constructor = Some(preferred);
    }
    Ok(constructor)
}

fn handle_constructors_impl(input: ItemImpl) -> syn::Result<proc_macro2::TokenStream> {
    if input.trait_.is_some() {
        return Err(Error::new(input.span(), "Trait impls are not supported"));
    }

    let self_ty = &input.self_ty;
    let mut constructors = Vec::new();

    for item in &input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let Some(preferred) = parse_constructor_attr(&method.attrs)? else {
            continue;
        };
        if method.sig.asyncness.is_some() {
            return Err(Error::new(
                method.sig.span(),
                "Constructor methods cannot be async",
            ));
        }

        let method_name = &method.sig.ident;
        let return_type = match &method.sig.output {
            syn::ReturnType::Default => {
                return Err(Error::new(
                    method.sig.span(),
                    "Constructor method must return Self",
                ));
            }
            syn::ReturnType::Type(_, ty) => ty.as_ref(),
        };
        let is_result = extract_generic_type(return_type, "Result").is_some();

        let mut arg_lets = Vec::new();
        let mut arg_names = Vec::new();
        let mut param_stmts = Vec::new();
        for fn_arg in &method.sig.inputs {
            let pat_type = match fn_arg {
                FnArg::Receiver(_) => {
                    return Err(Error::new(
                        fn_arg.span(),
                        "Constructor method cannot have self parameter",
                    ));
                }
                FnArg::Typed(pat_type) => pat_type,
            };
            let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
                return Err(Error::new(
                    pat_type.pat.span(),
                    "Only simple bindings supported",
                ));
            };
            let Some(contract) = extract_generic_type(&pat_type.ty, "Arc") else {
                return Err(Error::new(
                    pat_type.ty.span(),
                    "Arguments must be of type Arc<T>",
                ));
            };
            let arg_name = &pat_ident.ident;
            let param_name = arg_name.to_string();
            let param_name = param_name.strip_prefix("r#").unwrap_or(&param_name);
            arg_lets.push(quote! {
                let #arg_name = args.next::<#contract>()?;
            });
            arg_names.push(quote! { #arg_name });
            param_stmts.push(quote! {
                .param::<#contract>(#param_name)
            });
        }

        let method_call = quote! { Self::#method_name(#(#arg_names),*) };
        let build_body = if is_result {
            quote! {
                #(#arg_lets)*
                #method_call.map_err(|e| e.into())
            }
        } else {
            quote! {
                #(#arg_lets)*
                ::std::result::Result::Ok(#method_call)
            }
        };
        let args = if arg_lets.is_empty() {
            quote! { _ }
        } else {
            quote! { args }
        };
        let preferred_stmt = if preferred {
            quote! { .preferred() }
        } else {
            quote! {}
        };

        constructors.push(quote! {
            ::phoenix::ConstructorDescriptor::new(|#args| {
                #build_body
            })
            #(#param_stmts)*
            #preferred_stmt
        });
    }

    if constructors.is_empty() {
        return Err(Error::new(input.span(), "No constructor method found"));
    }

    // Remove constructor attributes from methods
    let mut cleaned_input = input.clone();
    for item in &mut cleaned_input.items {
        if let ImplItem::Fn(method) = item {
            method
                .attrs
                .retain(|attr| !attr.path().is_ident(CONSTRUCTOR_ATTR));
        }
    }

    Ok(quote! {
        #cleaned_input

        impl ::phoenix::Constructors for #self_ty {
            fn constructors() -> ::std::vec::Vec<::phoenix::ConstructorDescriptor> {
                ::std::vec![#(#constructors),*]
            }
        }
    })
}
