//! `#[managed_methods]` implementation

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{
	parse_macro_input, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Pat, Result,
	ReturnType, Type, Visibility,
};

use crate::attr::{flag, is_mbean, string, string_list, string_or_empty};

enum Declaration {
	None,
	Attribute(Option<LitStr>),
	Operation(OperationArgs),
}

#[derive(Default)]
struct OperationArgs {
	params: Vec<LitStr>,
	descriptions: Vec<LitStr>,
	action: Option<Ident>,
	description: Option<LitStr>,
}

struct MethodAttrs {
	annotated: bool,
	skip: bool,
	rename: Option<LitStr>,
	declaration: Declaration,
}

impl MethodAttrs {
	fn parse(method: &ImplItemFn) -> Result<Self> {
		let mut parsed = Self {
			annotated: false,
			skip: false,
			rename: None,
			declaration: Declaration::None,
		};

		for attr in method.attrs.iter().filter(|attr| is_mbean(attr)) {
			parsed.annotated = true;
			attr.parse_nested_meta(|meta| {
				if meta.path.is_ident("skip") {
					parsed.skip = flag(&meta)?;
				} else if meta.path.is_ident("rename") {
					parsed.rename = Some(string(&meta)?);
				} else if meta.path.is_ident("attribute") {
					let mut description = None;
					if meta.input.peek(syn::token::Paren) {
						meta.parse_nested_meta(|inner| {
							if inner.path.is_ident("description") {
								description = Some(string(&inner)?);
								Ok(())
							} else {
								Err(inner.error("unsupported mbean attribute argument"))
							}
						})?;
					}
					parsed.declaration = Declaration::Attribute(description);
				} else if meta.path.is_ident("operation") {
					let mut args = OperationArgs::default();
					if meta.input.peek(syn::token::Paren) {
						meta.parse_nested_meta(|inner| {
							if inner.path.is_ident("params") {
								args.params = string_list(&inner)?;
							} else if inner.path.is_ident("descriptions") {
								args.descriptions = string_list(&inner)?;
							} else if inner.path.is_ident("description") {
								args.description = Some(string(&inner)?);
							} else if inner.path.is_ident("action") {
								args.action = Some(action_variant(&string(&inner)?)?);
							} else {
								return Err(inner.error("unsupported mbean operation argument"));
							}
							Ok(())
						})?;
					}
					parsed.declaration = Declaration::Operation(args);
				} else {
					return Err(meta.error("unsupported mbean method attribute"));
				}
				Ok(())
			})?;
		}

		Ok(parsed)
	}
}

fn action_variant(action: &LitStr) -> Result<Ident> {
	let variant = match action.value().as_str() {
		"info" => "Info",
		"action" => "Action",
		"action_info" => "ActionInfo",
		"unknown" => "Unknown",
		_ => {
			return Err(syn::Error::new_spanned(
				action,
				"expected one of \"info\", \"action\", \"action_info\" or \"unknown\"",
			))
		}
	};

	Ok(Ident::new(variant, Span::call_site()))
}

pub fn managed_methods_impl(_args: TokenStream, input: TokenStream) -> TokenStream {
	let mut item = parse_macro_input!(input as ItemImpl);

	expand(&mut item)
		.unwrap_or_else(syn::Error::into_compile_error)
		.into()
}

fn expand(item: &mut ItemImpl) -> Result<proc_macro2::TokenStream> {
	if let Some((_, path, _)) = &item.trait_ {
		return Err(syn::Error::new_spanned(
			path,
			"#[managed_methods] goes on an inherent impl block",
		));
	}

	let mut registrations = Vec::new();
	for impl_item in &mut item.items {
		let ImplItem::Fn(method) = impl_item else {
			continue;
		};

		let attrs = MethodAttrs::parse(method)?;
		method.attrs.retain(|attr| !is_mbean(attr));

		if attrs.skip {
			continue;
		}
		if !attrs.annotated && !matches!(method.vis, Visibility::Public(_)) {
			continue;
		}

		match registration(method, &attrs) {
			Ok(Some(tokens)) => registrations.push(tokens),
			Ok(None) => {}
			// Unannotated methods that cannot be managed are left alone
			Err(e) if attrs.annotated => return Err(e),
			Err(_) => {}
		}
	}

	let self_ty = &item.self_ty;
	let (impl_generics, _, where_clause) = item.generics.split_for_impl();

	Ok(quote! {
		#item

		impl #impl_generics ::sd_mbean::ManagedMethods for #self_ty #where_clause {
			fn describe_methods(shape: &mut ::sd_mbean::TypeShape<Self>) {
				#(#registrations)*
			}
		}
	})
}

/// `Ok(None)` for methods without a `&self` receiver, which are never managed.
fn registration(
	method: &ImplItemFn,
	attrs: &MethodAttrs,
) -> Result<Option<proc_macro2::TokenStream>> {
	let sig = &method.sig;

	let Some(FnArg::Receiver(receiver)) = sig.inputs.first() else {
		return Ok(None);
	};
	if receiver.reference.is_none() || receiver.mutability.is_some() {
		return Err(syn::Error::new_spanned(
			receiver,
			"managed methods must take `&self`",
		));
	}
	if sig.asyncness.is_some() {
		return Err(syn::Error::new_spanned(
			sig.asyncness,
			"managed methods cannot be async",
		));
	}
	if sig.generics.type_params().next().is_some() || sig.generics.const_params().next().is_some() {
		return Err(syn::Error::new_spanned(
			&sig.generics,
			"managed methods cannot be generic",
		));
	}

	let mut param_names = Vec::new();
	let mut param_types = Vec::new();
	for input in sig.inputs.iter().skip(1) {
		let FnArg::Typed(typed) = input else {
			continue;
		};
		let name = match typed.pat.as_ref() {
			Pat::Ident(pat) => pat.ident.to_string(),
			_ => format!("p{}", param_names.len() + 1),
		};
		param_names.push(LitStr::new(name.trim_start_matches('_'), Span::call_site()));
		param_types.push(typed.ty.as_ref().clone());
	}

	let arg_idents = (0..param_types.len())
		.map(|idx| format_ident!("__arg{idx}"))
		.collect::<Vec<_>>();

	let returns: Type = match &sig.output {
		ReturnType::Default => syn::parse_quote!(()),
		ReturnType::Type(_, ty) => ty.as_ref().clone(),
	};

	let method_ident = &sig.ident;
	let name = attrs
		.rename
		.clone()
		.unwrap_or_else(|| LitStr::new(&method_ident.to_string(), method_ident.span()));

	let declaration = match &attrs.declaration {
		Declaration::None => None,
		Declaration::Attribute(description) => {
			let description = string_or_empty(description.as_ref());
			Some(quote!(.attribute(#description)))
		}
		Declaration::Operation(args) => {
			let params = &args.params;
			let descriptions = &args.descriptions;
			let action = args
				.action
				.clone()
				.unwrap_or_else(|| Ident::new("Unknown", Span::call_site()));
			let description = string_or_empty(args.description.as_ref());
			Some(quote! {
				.operation_with(::sd_mbean::OperationDecl {
					parameter_names: ::std::vec![#(::std::string::String::from(#params)),*],
					parameter_descriptions: ::std::vec![#(::std::string::String::from(#descriptions)),*],
					action: ::sd_mbean::OperationAction::#action,
					description: #description,
				})
			})
		}
	};

	let take_args = (!arg_idents.is_empty()).then(|| {
		quote! {
			let mut args = args.into_iter();
			#(let #arg_idents = ::sd_mbean::__private::take_arg::<#param_types>(&mut args)?;)*
		}
	});

	Ok(Some(quote! {
		shape.method(
			#name,
			::std::vec![#(::sd_mbean::Param::named::<#param_types>(#param_names)),*],
			<#returns as ::sd_mbean::IntoReturn>::VALUE_TYPE,
			|this: &Self, #[allow(unused_variables)] args: ::std::vec::Vec<::sd_mbean::Value>| {
				#take_args
				::sd_mbean::IntoReturn::into_return(this.#method_ident(#(#arg_idents),*))
					.map_err(::sd_mbean::MemberError::from)
			},
		)#declaration;
	}))
}
