//! Legacy command-line flag resolution.
//!
//! The installer accepts at most one flag (`-b` takes a value):
//!
//! | Flag            | Mode                         |
//! |-----------------|------------------------------|
//! | (none), `-all`  | install every component      |
//! | `-b <target>`   | select the firmware variant  |
//! | `-nomsdk`       | skip the Media SDK blocks    |
//! | `-cvsdk`        | install the legacy CV SDK    |
//! | `-h`            | print usage                  |
//!
//! Anything else is rejected with "not support".

use thiserror::Error;

use crate::firmware::FirmwareVariant;

/// Installation mode, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallMode {
    All,
    BuildTarget(String),
    NoMsdk,
    LegacyCvsdk,
}

impl InstallMode {
    /// Whether the Media SDK prerequisite blocks run.
    pub fn enable_msdk(&self) -> bool {
        !matches!(self, Self::NoMsdk)
    }

    /// Whether the legacy CV SDK replaces the current toolkit.
    pub fn install_cvsdk(&self) -> bool {
        matches!(self, Self::LegacyCvsdk)
    }

    /// Build target string, empty unless `-b` was given.
    pub fn build_target(&self) -> &str {
        match self {
            Self::BuildTarget(target) => target,
            _ => "",
        }
    }

    pub fn firmware(&self) -> FirmwareVariant {
        FirmwareVariant::for_target(self.build_target())
    }

    /// Short human-readable name used in logs and reports.
    pub fn describe(&self) -> String {
        match self {
            Self::All => "all".to_string(),
            Self::BuildTarget(target) => format!("build-target:{}", target),
            Self::NoMsdk => "no-msdk".to_string(),
            Self::LegacyCvsdk => "legacy-cvsdk".to_string(),
        }
    }
}

/// Parsed invocation: either print usage or run in a mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Run(InstallMode),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("not support")]
    NotSupported { args: Vec<String> },

    #[error("-b requires a build target")]
    MissingBuildTarget,
}

impl Invocation {
    /// Resolve the legacy flags (program name excluded).
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, ParseError> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        match args.as_slice() {
            [] | ["-all"] => Ok(Self::Run(InstallMode::All)),
            ["-h"] => Ok(Self::Help),
            ["-nomsdk"] => Ok(Self::Run(InstallMode::NoMsdk)),
            ["-cvsdk"] => Ok(Self::Run(InstallMode::LegacyCvsdk)),
            ["-b"] => Err(ParseError::MissingBuildTarget),
            ["-b", target] => Ok(Self::Run(InstallMode::BuildTarget(target.to_string()))),
            _ => Err(ParseError::NotSupported {
                args: args.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

/// Usage text for `-h`.
pub fn usage(program: &str) -> String {
    format!(
        "[{program} usage]\n\
         \t -h: display help\n\
         \t -all: install all components\n\
         \t -b BUILD_TARGET: select firmware for the build target (BXT or SKL)\n\
         \t -nomsdk: skip prerequisites for MSDK\n\
         \t -cvsdk: install the legacy CV SDK package\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_installs_everything() {
        let args: [&str; 0] = [];
        assert_eq!(
            Invocation::parse(&args),
            Ok(Invocation::Run(InstallMode::All))
        );
    }

    #[test]
    fn build_target_takes_its_value() {
        let parsed = Invocation::parse(&["-b", "BXT"]).unwrap();
        assert_eq!(
            parsed,
            Invocation::Run(InstallMode::BuildTarget("BXT".into()))
        );
    }

    #[test]
    fn build_target_without_value_is_rejected() {
        assert_eq!(
            Invocation::parse(&["-b"]),
            Err(ParseError::MissingBuildTarget)
        );
    }

    #[test]
    fn more_than_two_arguments_is_not_supported() {
        let err = Invocation::parse(&["-b", "BXT", "extra"]).unwrap_err();
        assert_eq!(err.to_string(), "not support");
    }

    #[test]
    fn unknown_flag_is_not_supported() {
        assert!(matches!(
            Invocation::parse(&["--all"]),
            Err(ParseError::NotSupported { .. })
        ));
        assert!(matches!(
            Invocation::parse(&["-nomsdk", "-cvsdk"]),
            Err(ParseError::NotSupported { .. })
        ));
    }

    #[test]
    fn mode_flags_map_to_gates() {
        let no_msdk = InstallMode::NoMsdk;
        assert!(!no_msdk.enable_msdk());
        assert!(!no_msdk.install_cvsdk());

        let cvsdk = InstallMode::LegacyCvsdk;
        assert!(cvsdk.enable_msdk());
        assert!(cvsdk.install_cvsdk());

        assert_eq!(InstallMode::All.build_target(), "");
    }

    #[test]
    fn usage_lists_every_flag() {
        let text = usage("vainstall");
        for flag in ["-h", "-all", "-b", "-nomsdk", "-cvsdk"] {
            assert!(text.contains(flag), "usage should mention {flag}");
        }
    }
}
