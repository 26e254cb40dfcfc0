//! Boards Manager package index rules.

use ardlint_core::data::{PackageIndex, PackageIndexData};
use ardlint_core::version::parse_relaxed;
use ardlint_core::{
    has_valid_package_index_filename, Descriptor, Mode, ModeConfig, ProjectType, RuleContext,
    RuleOutput,
};
use std::collections::HashSet;

use crate::util::fail_with_list;

const THIRD_PARTY_FILENAME_CONFIG: ModeConfig = ModeConfig {
    disable: &[Mode::Official],
    enable: &[Mode::Default],
    info: &[],
    warning: &[],
    error: &[Mode::Default],
};

const OFFICIAL_FILENAME_CONFIG: ModeConfig = ModeConfig {
    disable: &[Mode::Default],
    enable: &[Mode::Official],
    info: &[],
    warning: &[],
    error: &[Mode::Default],
};

pub(crate) const RULES: &[Descriptor] = &[
    Descriptor {
        id: "IS001",
        project_type: ProjectType::PackageIndex,
        category: "structure",
        subcategory: "package index file",
        brief: "package index missing",
        description: "A package index project holds a package index JSON file.",
        message_template: "No package index file found.",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: missing,
    },
    Descriptor {
        id: "IS002",
        project_type: ProjectType::PackageIndex,
        category: "structure",
        subcategory: "package index filename",
        brief: "invalid filename",
        description: "Third party package index files are named `package_<vendor>_index.json`.",
        message_template: "Invalid package index filename: {}. The filename must follow the pattern package_<vendor>_index.json.",
        mode_config: THIRD_PARTY_FILENAME_CONFIG,
        disable_subproject: false,
        check: invalid_filename,
    },
    Descriptor {
        id: "IS003",
        project_type: ProjectType::PackageIndex,
        category: "structure",
        subcategory: "package index filename",
        brief: "invalid official filename",
        description: "Official package index files are named `package_index.json` or `package_<vendor>_index.json`.",
        message_template: "Invalid package index filename: {}. The filename must follow the pattern package_index.json or package_<vendor>_index.json.",
        mode_config: OFFICIAL_FILENAME_CONFIG,
        disable_subproject: false,
        check: invalid_official_filename,
    },
    Descriptor {
        id: "IF001",
        project_type: ProjectType::PackageIndex,
        category: "data",
        subcategory: "general",
        brief: "JSON format",
        description: "The package index must be a valid JSON document.",
        message_template: "Invalid JSON format: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: json_format,
    },
    Descriptor {
        id: "IF002",
        project_type: ProjectType::PackageIndex,
        category: "data",
        subcategory: "general",
        brief: "index format",
        description: "The package index must have the packages, platforms and tools structure.",
        message_template: "Invalid package index format: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: index_format,
    },
    Descriptor {
        id: "IP001",
        project_type: ProjectType::PackageIndex,
        category: "data",
        subcategory: "packages",
        brief: "duplicate package name",
        description: "Package names identify packages and must be unique within an index.",
        message_template: "Duplicate package name(s): {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: duplicate_package_name,
    },
    Descriptor {
        id: "IP002",
        project_type: ProjectType::PackageIndex,
        category: "data",
        subcategory: "platforms",
        brief: "invalid platform version",
        description: "Platform versions must be semantic versions; `1.2` style short forms are accepted.",
        message_template: "Platform version(s) not compliant with the semver specification: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: platform_version_invalid,
    },
    Descriptor {
        id: "IP003",
        project_type: ProjectType::PackageIndex,
        category: "data",
        subcategory: "platforms",
        brief: "invalid platform archive URL",
        description: "Each platform release points at its archive with an absolute URL.",
        message_template: "Platform archive URL(s) with an invalid format: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: platform_url_invalid,
    },
];

fn data<'a>(ctx: &RuleContext<'a>) -> Result<&'a PackageIndexData, RuleOutput> {
    ctx.data
        .package_index()
        .ok_or_else(|| RuleOutput::not_run("Not a package index"))
}

fn loaded<'a>(ctx: &RuleContext<'a>) -> Result<&'a PackageIndex, RuleOutput> {
    data(ctx)?
        .index()
        .ok_or_else(|| RuleOutput::not_run("Error loading package index"))
}

fn missing(ctx: &RuleContext<'_>) -> RuleOutput {
    match ctx.data.package_index().and_then(PackageIndexData::path) {
        Some(_) => RuleOutput::pass(),
        None => RuleOutput::fail(""),
    }
}

fn filename_check(ctx: &RuleContext<'_>, official: bool) -> RuleOutput {
    let data = match data(ctx) {
        Ok(data) => data,
        Err(output) => return output,
    };
    let Some(path) = data.path() else {
        return RuleOutput::not_run("Package index not found");
    };
    if has_valid_package_index_filename(path, official) {
        RuleOutput::pass()
    } else {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        RuleOutput::fail(name)
    }
}

fn invalid_filename(ctx: &RuleContext<'_>) -> RuleOutput {
    filename_check(ctx, false)
}

fn invalid_official_filename(ctx: &RuleContext<'_>) -> RuleOutput {
    filename_check(ctx, true)
}

fn json_format(ctx: &RuleContext<'_>) -> RuleOutput {
    let data = match data(ctx) {
        Ok(data) => data,
        Err(output) => return output,
    };
    if data.path().is_none() {
        return RuleOutput::not_run("Package index not found");
    }
    match data.json_error() {
        Some(error) => RuleOutput::fail(error),
        None => RuleOutput::pass(),
    }
}

fn index_format(ctx: &RuleContext<'_>) -> RuleOutput {
    let data = match data(ctx) {
        Ok(data) => data,
        Err(output) => return output,
    };
    if data.path().is_none() {
        return RuleOutput::not_run("Package index not found");
    }
    match data.index_error() {
        Some(error) => RuleOutput::fail(error),
        None => RuleOutput::pass(),
    }
}

fn duplicate_package_name(ctx: &RuleContext<'_>) -> RuleOutput {
    let index = match loaded(ctx) {
        Ok(index) => index,
        Err(output) => return output,
    };

    let mut seen = HashSet::new();
    let mut duplicates: Vec<&str> = Vec::new();
    for package in &index.packages {
        if !seen.insert(package.name.as_str()) && !duplicates.contains(&package.name.as_str()) {
            duplicates.push(&package.name);
        }
    }
    fail_with_list(&duplicates)
}

/// `package:architecture@version` of every platform release matching `invalid`.
fn platform_releases(index: &PackageIndex, invalid: impl Fn(&str, &str) -> bool) -> Vec<String> {
    index
        .packages
        .iter()
        .flat_map(|package| {
            package
                .platforms
                .iter()
                .map(move |platform| (package, platform))
        })
        .filter(|(_, platform)| invalid(&platform.version, &platform.url))
        .map(|(package, platform)| {
            format!(
                "{}:{}@{}",
                package.name, platform.architecture, platform.version
            )
        })
        .collect()
}

fn platform_version_invalid(ctx: &RuleContext<'_>) -> RuleOutput {
    match loaded(ctx) {
        Ok(index) => fail_with_list(&platform_releases(index, |version, _| {
            parse_relaxed(version).is_none()
        })),
        Err(output) => output,
    }
}

fn platform_url_invalid(ctx: &RuleContext<'_>) -> RuleOutput {
    match loaded(ctx) {
        Ok(index) => fail_with_list(&platform_releases(index, |_, url| {
            url::Url::parse(url).is_err()
        })),
        Err(output) => output,
    }
}
