//! Hierarchical bean names.
//!
//! A name renders as `domain:key=value,...,name=leaf`. Folders come first in declaration order
//! (outer to inner), then extra qualifiers, then the leaf. Rendering never sorts, so the same inputs
//! always produce the same string, which is what the registry uses for uniqueness.

use std::{
	borrow::Borrow,
	cmp::Ordering,
	collections::HashSet,
	convert::Infallible,
	fmt,
	hash::{Hash, Hasher},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use super::{
	error::{Error, ResolutionError, Result},
	shape::TypeShape,
};

/// Key used for the leaf segment of every rendered name.
pub const LEAF_KEY: &str = "name";

const RESERVED: [char; 7] = ['"', ',', ':', '=', '?', '*', '\n'];

/// Whether `value` must be quoted to be embedded in a rendered name.
#[must_use]
pub fn needs_quoting(value: &str) -> bool {
	value.is_empty()
		|| value.contains(RESERVED)
		|| value.starts_with(char::is_whitespace)
		|| value.ends_with(char::is_whitespace)
}

/// Wraps `value` in quotes, escaping `"`, `\`, `*`, `?` and newlines.
#[must_use]
pub fn quote(value: &str) -> String {
	let mut quoted = String::with_capacity(value.len() + 2);
	quoted.push('"');
	for c in value.chars() {
		match c {
			'"' | '\\' | '*' | '?' => {
				quoted.push('\\');
				quoted.push(c);
			}
			'\n' => quoted.push_str("\\n"),
			c => quoted.push(c),
		}
	}
	quoted.push('"');

	quoted
}

/// Reverses [`quote`].
pub fn unquote(quoted: &str) -> Result<String> {
	let invalid = || Error::InvalidName(format!("malformed quoted value: {quoted}"));

	let inner = quoted
		.strip_prefix('"')
		.and_then(|rest| rest.strip_suffix('"'))
		.ok_or_else(invalid)?;

	let mut value = String::with_capacity(inner.len());
	let mut chars = inner.chars();
	while let Some(c) = chars.next() {
		match c {
			'\\' => match chars.next() {
				Some('n') => value.push('\n'),
				Some(escaped @ ('"' | '\\' | '*' | '?')) => value.push(escaped),
				_ => return Err(invalid()),
			},
			'"' => return Err(invalid()),
			c => value.push(c),
		}
	}

	Ok(value)
}

/// Quotes `value` only when it carries a reserved character.
#[must_use]
pub fn escape_value(value: &str) -> String {
	if needs_quoting(value) {
		quote(value)
	} else {
		value.to_string()
	}
}

/// Reverses [`escape_value`].
pub fn unescape_value(text: &str) -> Result<String> {
	if text.starts_with('"') {
		unquote(text)
	} else {
		Ok(text.to_string())
	}
}

/// One level of the folder path.
///
/// Folders without an explicit field render with their two digit position as key (`00=foo,01=bar`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderName {
	field: Option<String>,
	value: String,
}

impl FolderName {
	pub fn new(value: impl Into<String>) -> Self {
		Self {
			field: None,
			value: value.into(),
		}
	}

	pub fn with_field(field: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			field: Some(field.into()),
			value: value.into(),
		}
	}

	/// Reads `"field=value"` or a bare `"value"`.
	#[must_use]
	pub fn parse(text: &str) -> Self {
		text.split_once('=').map_or_else(
			|| Self::new(text),
			|(field, value)| Self::with_field(field.trim(), value),
		)
	}

	#[must_use]
	pub fn field(&self) -> Option<&str> {
		self.field.as_deref()
	}

	#[must_use]
	pub fn value(&self) -> &str {
		&self.value
	}
}

impl FromStr for FolderName {
	type Err = Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::parse(s))
	}
}

/// Builds and validates a [`BeanName`].
#[derive(Debug, Clone)]
pub struct NameBuilder {
	domain: String,
	leaf: String,
	folders: Vec<FolderName>,
	qualifiers: Vec<(String, String)>,
}

impl NameBuilder {
	pub fn new(domain: impl Into<String>, leaf: impl Into<String>) -> Self {
		Self {
			domain: domain.into(),
			leaf: leaf.into(),
			folders: Vec::new(),
			qualifiers: Vec::new(),
		}
	}

	#[must_use]
	pub fn folder(mut self, folder: FolderName) -> Self {
		self.folders.push(folder);
		self
	}

	#[must_use]
	pub fn folders(mut self, folders: impl IntoIterator<Item = FolderName>) -> Self {
		self.folders.extend(folders);
		self
	}

	#[must_use]
	pub fn qualifier(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.qualifiers.push((key.into(), value.into()));
		self
	}

	#[must_use]
	pub fn qualifiers(mut self, qualifiers: impl IntoIterator<Item = (String, String)>) -> Self {
		self.qualifiers.extend(qualifiers);
		self
	}

	pub fn build(self) -> Result<BeanName> {
		let Self {
			domain,
			leaf,
			folders,
			qualifiers,
		} = self;

		let domain = domain.trim().to_string();
		if domain.is_empty() {
			return Err(Error::InvalidName("domain is empty".to_string()));
		}
		if domain.contains([':', '*', '?', '\n']) {
			return Err(Error::InvalidName(format!(
				"domain contains a reserved character: {domain}"
			)));
		}
		if leaf.trim().is_empty() {
			return Err(Error::InvalidName(format!("leaf name is empty in domain '{domain}'")));
		}

		let folders = folders
			.into_iter()
			.enumerate()
			.map(|(idx, FolderName { field, value })| {
				(field.unwrap_or_else(|| format!("{idx:02}")), value)
			})
			.collect::<Vec<_>>();

		check_keys(&folders, &qualifiers)?;

		let rendered = render(&domain, &folders, &qualifiers, &leaf);

		Ok(BeanName {
			domain,
			folders,
			qualifiers,
			leaf,
			rendered,
		})
	}
}

fn check_keys(folders: &[(String, String)], qualifiers: &[(String, String)]) -> Result<()> {
	let mut seen = HashSet::with_capacity(folders.len() + qualifiers.len() + 1);
	for key in folders
		.iter()
		.chain(qualifiers)
		.map(|(key, _)| key.as_str())
		.chain([LEAF_KEY])
	{
		if key.is_empty() || needs_quoting(key) || key.contains('\\') {
			return Err(Error::InvalidName(format!("invalid key: {key:?}")));
		}
		if !seen.insert(key) {
			return Err(Error::InvalidName(format!("duplicate key: {key}")));
		}
	}

	Ok(())
}

fn render(
	domain: &str,
	folders: &[(String, String)],
	qualifiers: &[(String, String)],
	leaf: &str,
) -> String {
	let mut rendered = format!("{domain}:");
	for (key, value) in folders.iter().chain(qualifiers) {
		rendered.push_str(key);
		rendered.push('=');
		rendered.push_str(&escape_value(value));
		rendered.push(',');
	}
	rendered.push_str(LEAF_KEY);
	rendered.push('=');
	rendered.push_str(&escape_value(leaf));

	rendered
}

/// A validated hierarchical name with its cached rendering.
///
/// Equality, ordering and hashing all follow the rendered string.
#[derive(Debug, Clone)]
pub struct BeanName {
	domain: String,
	folders: Vec<(String, String)>,
	qualifiers: Vec<(String, String)>,
	leaf: String,
	rendered: String,
}

impl BeanName {
	/// Name with just a domain and a leaf, `domain:name=leaf`.
	pub fn new(domain: impl Into<String>, leaf: impl Into<String>) -> Result<Self> {
		NameBuilder::new(domain, leaf).build()
	}

	#[must_use]
	pub fn domain(&self) -> &str {
		&self.domain
	}

	#[must_use]
	pub fn leaf(&self) -> &str {
		&self.leaf
	}

	#[must_use]
	pub fn folders(&self) -> &[(String, String)] {
		&self.folders
	}

	#[must_use]
	pub fn qualifiers(&self) -> &[(String, String)] {
		&self.qualifiers
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.rendered
	}

	/// Rebuilds this name with more qualifiers appended after the existing ones.
	pub fn with_qualifiers(&self, extra: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
		NameBuilder::new(self.domain.clone(), self.leaf.clone())
			.folders(
				self.folders
					.iter()
					.map(|(key, value)| FolderName::with_field(key.clone(), value.clone())),
			)
			.qualifiers(self.qualifiers.iter().cloned())
			.qualifiers(extra)
			.build()
	}
}

impl fmt::Display for BeanName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.rendered)
	}
}

impl AsRef<str> for BeanName {
	fn as_ref(&self) -> &str {
		&self.rendered
	}
}

impl Borrow<str> for BeanName {
	fn borrow(&self) -> &str {
		&self.rendered
	}
}

impl PartialEq for BeanName {
	fn eq(&self, other: &Self) -> bool {
		self.rendered == other.rendered
	}
}

impl Eq for BeanName {}

impl Hash for BeanName {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.rendered.hash(state);
	}
}

impl PartialOrd for BeanName {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for BeanName {
	fn cmp(&self, other: &Self) -> Ordering {
		self.rendered.cmp(&other.rendered)
	}
}

impl Serialize for BeanName {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.rendered)
	}
}

/// An object able to supply its own name parts.
///
/// Any part left as `None` falls back to the type's resource metadata. Only naming is affected,
/// attributes and operations still come from the resolution mode.
pub trait SelfNaming {
	fn domain_name(&self) -> Option<String>;

	fn bean_name(&self) -> Option<String>;

	fn folder_names(&self) -> Option<Vec<FolderName>> {
		None
	}
}

/// Name parts captured from a [`SelfNaming`] object at registration time.
#[derive(Debug, Clone, Default)]
pub struct NameParts {
	pub domain: Option<String>,
	pub bean_name: Option<String>,
	pub folders: Option<Vec<FolderName>>,
}

impl NameParts {
	pub fn of<T: SelfNaming>(target: &T) -> Self {
		Self {
			domain: target.domain_name(),
			bean_name: target.bean_name(),
			folders: target.folder_names(),
		}
	}
}

pub(crate) fn parse_field_value(entry: &str) -> Result<(String, String), ResolutionError> {
	entry
		.split_once('=')
		.map(|(key, value)| (key.trim().to_string(), value.to_string()))
		.filter(|(key, _)| !key.is_empty())
		.ok_or_else(|| ResolutionError::MalformedFieldValue(entry.to_string()))
}

/// Empty or blank name parts count as unset.
fn non_blank(part: Option<String>) -> Option<String> {
	part.filter(|part| !part.trim().is_empty())
}

/// Derives the name of `target` from its self-naming capability, falling back to resource
/// metadata, then to `default_domain` and the short type name.
pub(crate) fn derive_name<T>(
	target: &T,
	shape: &TypeShape<T>,
	default_domain: Option<&str>,
	extra: &[(String, String)],
) -> Result<BeanName> {
	let parts = shape.name_parts(target).unwrap_or_default();
	let resource = shape.resource();

	let domain = non_blank(parts.domain)
		.or_else(|| resource.and_then(|resource| non_blank(resource.domain.clone())))
		.or_else(|| non_blank(default_domain.map(ToString::to_string)))
		.ok_or_else(|| {
			Error::InvalidName(format!(
				"no domain could be determined for <type='{}'>",
				shape.type_name()
			))
		})?;

	let leaf = non_blank(parts.bean_name)
		.or_else(|| resource.and_then(|resource| non_blank(resource.bean_name.clone())))
		.unwrap_or_else(|| shape.short_type_name().to_string());

	let folders = parts
		.folders
		.filter(|folders| !folders.is_empty())
		.or_else(|| resource.map(|resource| resource.folders.clone()))
		.unwrap_or_default();

	let field_values = resource
		.map(|resource| {
			resource
				.field_values
				.iter()
				.map(|entry| parse_field_value(entry))
				.collect::<Result<Vec<_>, _>>()
		})
		.transpose()
		.map_err(Error::resolution::<T>)?
		.unwrap_or_default();

	NameBuilder::new(domain, leaf)
		.folders(folders)
		.qualifiers(field_values)
		.qualifiers(extra.iter().cloned())
		.build()
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn renders_folders_qualifiers_then_leaf() {
		let name = NameBuilder::new("j256.simplejmx", "RuntimeCounter")
			.folder(FolderName::new("foo"))
			.folder(FolderName::with_field("type", "cache"))
			.qualifier("shard", "3")
			.build()
			.unwrap();

		assert_eq!(
			name.as_str(),
			"j256.simplejmx:00=foo,type=cache,shard=3,name=RuntimeCounter"
		);
		assert_eq!(name.folders().len(), 2);
		assert_eq!(name.qualifiers(), [("shard".to_string(), "3".to_string())]);
	}

	#[test]
	fn rendering_is_deterministic() {
		let build = || {
			NameBuilder::new("domain", "bean")
				.folder(FolderName::new("b"))
				.folder(FolderName::new("a"))
				.qualifier("z", "1")
				.qualifier("y", "2")
				.build()
				.unwrap()
		};

		assert_eq!(build().as_str(), build().as_str());
		assert_eq!(build().as_str(), "domain:00=b,01=a,z=1,y=2,name=bean");
	}

	#[test]
	fn empty_domain_or_leaf_is_rejected() {
		assert!(matches!(BeanName::new("  ", "x"), Err(Error::InvalidName(_))));
		assert!(matches!(BeanName::new("d", " \t"), Err(Error::InvalidName(_))));
		assert!(matches!(BeanName::new("a:b", "x"), Err(Error::InvalidName(_))));
	}

	#[test]
	fn duplicate_and_reserved_keys_are_rejected() {
		assert!(NameBuilder::new("d", "x").qualifier("name", "y").build().is_err());
		assert!(NameBuilder::new("d", "x")
			.qualifier("k", "1")
			.qualifier("k", "2")
			.build()
			.is_err());
		assert!(NameBuilder::new("d", "x").qualifier("a,b", "1").build().is_err());
	}

	#[test]
	fn reserved_values_are_quoted() {
		let name = NameBuilder::new("d", "a,b")
			.qualifier("pattern", "*.log?")
			.build()
			.unwrap();

		assert_eq!(name.as_str(), r#"d:pattern="\*.log\?",name="a,b""#);
		assert_eq!(escape_value(" padded"), "\" padded\"");
		assert_eq!(escape_value(r#"say "hi""#), r#""say \"hi\"""#);
	}

	#[test]
	fn folder_names_parse_optional_fields() {
		assert_eq!(FolderName::parse("foo"), FolderName::new("foo"));
		assert_eq!(FolderName::parse("type=cache"), FolderName::with_field("type", "cache"));
	}

	#[test]
	fn malformed_quotes_fail() {
		assert!(unquote("\"abc").is_err());
		assert!(unquote("\"a\"b\"").is_err());
		assert!(unquote("\"bad\\x\"").is_err());
		assert!(unquote("\"").is_err());
	}

	#[test]
	fn with_qualifiers_keeps_rendering_order() {
		let name = NameBuilder::new("d", "leaf")
			.folder(FolderName::new("outer"))
			.build()
			.unwrap()
			.with_qualifiers([("k".to_string(), "v".to_string())])
			.unwrap();

		assert_eq!(name.as_str(), "d:00=outer,k=v,name=leaf");
	}

	proptest! {
		#[test]
		fn quote_round_trips(value in any::<String>()) {
			prop_assert_eq!(unquote(&quote(&value)).unwrap(), value);
		}

		#[test]
		fn escape_round_trips(value in any::<String>()) {
			prop_assert_eq!(unescape_value(&escape_value(&value)).unwrap(), value);
		}

		#[test]
		fn reserved_characters_force_quotes(
			prefix in "[a-z]{0,4}",
			reserved in prop::sample::select(vec![',', ':', '=', '"', '*', '?']),
			suffix in "[a-z]{0,4}",
		) {
			let value = format!("{prefix}{reserved}{suffix}");
			let escaped = escape_value(&value);
			prop_assert!(escaped.starts_with('"') && escaped.ends_with('"'));
			prop_assert_eq!(unquote(&escaped).unwrap(), value);
		}
	}
}
