//! `#[derive(ManagedBean)]` implementation

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DataStruct, DeriveInput, Field, Fields, LitStr, Result};

use crate::attr::{flag, is_mbean, optional_string, string, string_list, string_or_empty};

#[derive(Default)]
struct BeanAttrs {
	domain: Option<LitStr>,
	name: Option<LitStr>,
	folders: Vec<LitStr>,
	field_values: Vec<LitStr>,
	description: Option<LitStr>,
	self_naming: bool,
	no_methods: bool,
}

impl BeanAttrs {
	fn parse(input: &DeriveInput) -> Result<Self> {
		let mut parsed = Self::default();

		for attr in input.attrs.iter().filter(|attr| is_mbean(attr)) {
			attr.parse_nested_meta(|meta| {
				if meta.path.is_ident("domain") {
					parsed.domain = Some(string(&meta)?);
				} else if meta.path.is_ident("name") {
					parsed.name = Some(string(&meta)?);
				} else if meta.path.is_ident("description") {
					parsed.description = Some(string(&meta)?);
				} else if meta.path.is_ident("folders") {
					parsed.folders.extend(string_list(&meta)?);
				} else if meta.path.is_ident("fields") {
					parsed.field_values.extend(string_list(&meta)?);
				} else if meta.path.is_ident("self_naming") {
					parsed.self_naming = flag(&meta)?;
				} else if meta.path.is_ident("no_methods") {
					parsed.no_methods = flag(&meta)?;
				} else {
					return Err(meta.error("unsupported mbean type attribute"));
				}
				Ok(())
			})?;
		}

		Ok(parsed)
	}
}

struct AttributeArgs {
	readable: bool,
	writable: bool,
	description: Option<LitStr>,
}

struct FieldAttrs {
	exposed: bool,
	rename: Option<LitStr>,
	attribute: Option<AttributeArgs>,
}

impl FieldAttrs {
	fn parse(field: &Field) -> Result<Self> {
		let mut parsed = Self {
			exposed: false,
			rename: None,
			attribute: None,
		};

		for attr in field.attrs.iter().filter(|attr| is_mbean(attr)) {
			parsed.exposed = true;
			attr.parse_nested_meta(|meta| {
				if meta.path.is_ident("field") {
					Ok(())
				} else if meta.path.is_ident("rename") {
					parsed.rename = Some(string(&meta)?);
					Ok(())
				} else if meta.path.is_ident("attribute") {
					let mut args = AttributeArgs {
						readable: true,
						writable: false,
						description: None,
					};
					if meta.input.peek(syn::token::Paren) {
						meta.parse_nested_meta(|inner| {
							if inner.path.is_ident("readable") {
								args.readable = flag(&inner)?;
							} else if inner.path.is_ident("writable") {
								args.writable = flag(&inner)?;
							} else if inner.path.is_ident("description") {
								args.description = Some(string(&inner)?);
							} else {
								return Err(inner.error("unsupported mbean attribute argument"));
							}
							Ok(())
						})?;
					}
					parsed.attribute = Some(args);
					Ok(())
				} else {
					Err(meta.error("unsupported mbean field attribute"))
				}
			})?;
		}

		Ok(parsed)
	}
}

pub fn derive_impl(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);

	expand(&input)
		.unwrap_or_else(syn::Error::into_compile_error)
		.into()
}

fn expand(input: &DeriveInput) -> Result<proc_macro2::TokenStream> {
	let Data::Struct(DataStruct {
		fields: Fields::Named(fields),
		..
	}) = &input.data
	else {
		return Err(syn::Error::new_spanned(
			&input.ident,
			"ManagedBean can only be derived for structs with named fields",
		));
	};

	let attrs = BeanAttrs::parse(input)?;
	let ident = &input.ident;
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	let domain = optional_string(attrs.domain.as_ref());
	let bean_name = optional_string(attrs.name.as_ref());
	let description = optional_string(attrs.description.as_ref());
	let folders = &attrs.folders;
	let field_values = &attrs.field_values;

	let mut members = Vec::new();
	for field in &fields.named {
		let field_attrs = FieldAttrs::parse(field)?;
		if !field_attrs.exposed {
			continue;
		}

		let Some(field_ident) = &field.ident else {
			continue;
		};
		let name = field_attrs
			.rename
			.clone()
			.unwrap_or_else(|| LitStr::new(&field_ident.to_string(), field_ident.span()));

		let declaration = field_attrs.attribute.as_ref().map(|args| {
			let readable = args.readable;
			let writable = args.writable;
			let description = string_or_empty(args.description.as_ref());
			quote!(.attribute(#readable, #writable, #description))
		});

		members.push(quote! {
			shape.field(#name, |this: &Self| &this.#field_ident)#declaration;
		});
	}

	let self_naming = attrs.self_naming.then(|| quote!(shape.self_naming();));
	let methods = (!attrs.no_methods)
		.then(|| quote!(<Self as ::sd_mbean::ManagedMethods>::describe_methods(shape);));

	Ok(quote! {
		impl #impl_generics ::sd_mbean::Introspect for #ident #ty_generics #where_clause {
			fn describe(shape: &mut ::sd_mbean::TypeShape<Self>) {
				shape.set_resource(::sd_mbean::ResourceMetadata {
					domain: #domain,
					bean_name: #bean_name,
					folders: ::std::vec![#(::sd_mbean::FolderName::parse(#folders)),*],
					field_values: ::std::vec![#(::std::string::String::from(#field_values)),*],
					description: #description,
				});
				#self_naming
				#(#members)*
				#methods
			}
		}
	})
}
