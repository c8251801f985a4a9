//! Static framework profiles
//!
//! Table-driven mapping from a detected framework to its build and
//! serve commands. Adding a framework means adding a table entry.

use crate::deploy::exec::CommandSpec;
use crate::deploy::manifest::{Framework, PackageManifest};

/// Build/serve profile for one framework
#[derive(Debug)]
pub struct FrameworkProfile {
    pub framework: Framework,

    /// Build command, absent for frameworks served directly
    pub build: Option<&'static [&'static str]>,
    pub build_headline: Option<&'static str>,

    /// Serve command; `{port}` and `{entry}` are substituted at launch
    pub serve: &'static [&'static str],
    pub serve_headline: &'static str,
}

const PROFILES: &[FrameworkProfile] = &[
    FrameworkProfile {
        framework: Framework::Next,
        build: Some(&["npm", "run", "build"]),
        build_headline: Some("\n> Building Next.js app..."),
        serve: &["npx", "next", "start", "-p", "{port}"],
        serve_headline: "\n> Starting Next.js app on port {port}...",
    },
    FrameworkProfile {
        framework: Framework::React,
        build: Some(&["npm", "run", "build"]),
        build_headline: Some("\n> Building React app..."),
        serve: &["npx", "serve", "-s", "build", "-l", "{port}"],
        serve_headline: "\n> Serving build folder on port {port}...",
    },
    FrameworkProfile {
        framework: Framework::Vite,
        build: Some(&["npm", "run", "build"]),
        build_headline: Some("\n> Building Vite app..."),
        serve: &["npx", "vite", "preview", "--port", "{port}"],
        serve_headline: "\n> Previewing Vite build on port {port}...",
    },
    FrameworkProfile {
        framework: Framework::Express,
        build: None,
        build_headline: None,
        serve: &["node", "{entry}"],
        serve_headline: "\n> Starting Express app on port {port}...",
    },
    FrameworkProfile {
        framework: Framework::Node,
        build: None,
        build_headline: None,
        serve: &["npm", "start"],
        serve_headline: "\n> Starting app with npm start on port {port}...",
    },
];

/// Look up the profile for a framework
pub fn profile_for(framework: Framework) -> &'static FrameworkProfile {
    // Table order matches the Framework variants
    match framework {
        Framework::Next => &PROFILES[0],
        Framework::React => &PROFILES[1],
        Framework::Vite => &PROFILES[2],
        Framework::Express => &PROFILES[3],
        Framework::Node => &PROFILES[4],
    }
}

impl FrameworkProfile {
    /// Serve URL for a deployment on the given port
    pub fn url(&self, port: u16) -> String {
        format!("http://localhost:{}", port)
    }

    /// Build command spec, if this framework requires a build step
    pub fn build_spec(&self) -> Option<CommandSpec> {
        self.build.map(|argv| {
            CommandSpec::new(
                argv[0],
                argv[1..].iter().map(|s| s.to_string()).collect(),
            )
        })
    }

    /// Serve command spec with placeholders substituted
    pub fn serve_spec(&self, manifest: &PackageManifest, port: u16) -> CommandSpec {
        let args = self.serve[1..]
            .iter()
            .map(|arg| {
                arg.replace("{port}", &port.to_string())
                    .replace("{entry}", manifest.entry_point())
            })
            .collect();
        CommandSpec::new(self.serve[0], args)
    }

    /// Serve headline with the port substituted
    pub fn serve_headline_for(&self, port: u16) -> String {
        self.serve_headline.replace("{port}", &port.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_framework_has_a_profile() {
        for framework in [
            Framework::Next,
            Framework::React,
            Framework::Vite,
            Framework::Express,
            Framework::Node,
        ] {
            assert_eq!(profile_for(framework).framework, framework);
        }
    }

    #[test]
    fn test_express_entry_substitution() {
        let manifest = PackageManifest {
            main: Some("server.js".to_string()),
            ..Default::default()
        };
        let spec = profile_for(Framework::Express).serve_spec(&manifest, 5000);
        assert_eq!(spec.program, "node");
        assert_eq!(spec.args, vec!["server.js"]);
    }

    #[test]
    fn test_port_substitution() {
        let spec = profile_for(Framework::Next).serve_spec(&PackageManifest::default(), 5123);
        assert!(spec.args.contains(&"5123".to_string()));
    }
}
