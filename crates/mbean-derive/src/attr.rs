//! Shared `#[mbean(..)]` parsing helpers

use proc_macro2::TokenStream;
use quote::quote;
use syn::{meta::ParseNestedMeta, punctuated::Punctuated, Attribute, LitBool, LitStr, Result, Token};

pub fn is_mbean(attr: &Attribute) -> bool {
	attr.path().is_ident("mbean")
}

/// `key("a", "b", ..)`
pub fn string_list(meta: &ParseNestedMeta<'_>) -> Result<Vec<LitStr>> {
	let content;
	syn::parenthesized!(content in meta.input);

	Ok(Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?
		.into_iter()
		.collect())
}

/// `key` alone means `true`, otherwise `key = bool`.
pub fn flag(meta: &ParseNestedMeta<'_>) -> Result<bool> {
	if meta.input.peek(Token![=]) {
		Ok(meta.value()?.parse::<LitBool>()?.value)
	} else {
		Ok(true)
	}
}

pub fn string(meta: &ParseNestedMeta<'_>) -> Result<LitStr> {
	meta.value()?.parse()
}

pub fn optional_string(lit: Option<&LitStr>) -> TokenStream {
	lit.map_or_else(
		|| quote!(::core::option::Option::None),
		|lit| quote!(::core::option::Option::Some(::std::string::String::from(#lit))),
	)
}

pub fn string_or_empty(lit: Option<&LitStr>) -> TokenStream {
	lit.map_or_else(
		|| quote!(::std::string::String::new()),
		|lit| quote!(::std::string::String::from(#lit)),
	)
}
