//! Mapping from release tags to npm registry coordinates.
//!
//! Monorepos tag releases with the package name, e.g. `svelte@5.0.0` or
//! `@sveltejs/kit@1.0.0`. The registry serves the matching tarballs at
//!
//! ```text
//! {registry}/svelte/-/svelte-5.0.0.tgz
//! {registry}/@sveltejs/kit/-/kit-1.0.0.tgz
//! ```

/// Registry coordinates of a release tarball.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCoordinates {
    package: String,
    archive: String,
}

impl PackageCoordinates {
    /// Derive coordinates from a release tag.
    ///
    /// - Scoped tags (`@scope/name@version`): the package is `@scope/name`.
    /// - Other tags: the package is everything before the first `@`.
    ///
    /// The archive stem is the part of the tag after the first `/` (the whole
    /// tag when there is none) with every `@` replaced by `-`.
    pub fn from_tag(tag: &str) -> Self {
        let package = if tag.starts_with('@') {
            match tag.split('@').nth(1) {
                Some(scoped) => format!("@{scoped}"),
                None => tag.to_string(),
            }
        } else {
            tag.split('@').next().unwrap_or(tag).to_string()
        };

        let archive = tag
            .split_once('/')
            .map_or(tag, |(_, rest)| rest)
            .replace('@', "-");

        Self { package, archive }
    }

    /// Full package name, including the scope for scoped packages.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Scope (`@scope`) of a scoped package.
    pub fn scope(&self) -> Option<&str> {
        if !self.package.starts_with('@') {
            return None;
        }
        Some(
            self.package
                .split_once('/')
                .map_or(self.package.as_str(), |(scope, _)| scope),
        )
    }

    /// Package name without its scope.
    pub fn name(&self) -> &str {
        match self.scope() {
            Some(scope) => self.package[scope.len()..].trim_start_matches('/'),
            None => &self.package,
        }
    }

    /// File stem of the tarball, without `.tgz`.
    pub fn archive(&self) -> &str {
        &self.archive
    }

    /// Tarball URL on the given registry.
    pub fn tarball_url(&self, registry: &str) -> String {
        format!(
            "{}/{}/-/{}.tgz",
            registry.trim_end_matches('/'),
            self.package,
            self.archive
        )
    }
}
