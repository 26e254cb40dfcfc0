//! Boards platform rules.

use crate::sketch::LICENSE_CONFIG;
use crate::util::{missing_license_file, missing_readme};
use ardlint_core::data::{ConfigurationFile, PlatformData};
use ardlint_core::{Descriptor, ModeConfig, ProjectType, RuleContext, RuleOutput};

pub(crate) const RULES: &[Descriptor] = &[
    Descriptor {
        id: "PS001",
        project_type: ProjectType::Platform,
        category: "structure",
        subcategory: "boards.txt",
        brief: "boards.txt missing",
        description: "Every boards platform defines its boards in boards.txt.",
        message_template: "Required boards.txt is missing. Expected at: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: boards_txt_missing,
    },
    Descriptor {
        id: "PF001",
        project_type: ProjectType::Platform,
        category: "configuration files",
        subcategory: "boards.txt",
        brief: "boards.txt format",
        description: "boards.txt holds one `key=value` pair per line.",
        message_template: "boards.txt has an invalid format: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: boards_txt_format,
    },
    Descriptor {
        id: "PF002",
        project_type: ProjectType::Platform,
        category: "configuration files",
        subcategory: "platform.txt",
        brief: "platform.txt format",
        description: "platform.txt holds one `key=value` pair per line.",
        message_template: "platform.txt has an invalid format: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: platform_txt_format,
    },
    Descriptor {
        id: "PF003",
        project_type: ProjectType::Platform,
        category: "configuration files",
        subcategory: "programmers.txt",
        brief: "programmers.txt format",
        description: "programmers.txt holds one `key=value` pair per line.",
        message_template: "programmers.txt has an invalid format: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: programmers_txt_format,
    },
    Descriptor {
        id: "PD001",
        project_type: ProjectType::Platform,
        category: "documentation",
        subcategory: "readme",
        brief: "missing readme",
        description: "A readme documents the boards and how to install the platform.",
        message_template: "No readme found. Please document your platform.",
        mode_config: ModeConfig::WARNING_STRICT_ERROR,
        disable_subproject: false,
        check: missing_readme,
    },
    Descriptor {
        id: "PD002",
        project_type: ProjectType::Platform,
        category: "documentation",
        subcategory: "license",
        brief: "missing license file",
        description: "A license file in the platform root tells users the terms of use.",
        message_template: "No license file found.",
        mode_config: LICENSE_CONFIG,
        disable_subproject: false,
        check: missing_license_file,
    },
];

fn boards_txt_missing(ctx: &RuleContext<'_>) -> RuleOutput {
    let path = ctx.data.folder().join("boards.txt");
    match ctx.data.platform() {
        Some(platform) if platform.boards.exists() => RuleOutput::pass(),
        _ => RuleOutput::fail(path.display().to_string()),
    }
}

fn boards_txt_format(ctx: &RuleContext<'_>) -> RuleOutput {
    let Some(platform) = ctx.data.platform() else {
        return RuleOutput::not_run("Not a platform");
    };
    if !platform.boards.exists() {
        return RuleOutput::not_run("boards.txt missing");
    }
    configuration_format(&platform.boards)
}

fn platform_txt_format(ctx: &RuleContext<'_>) -> RuleOutput {
    optional_configuration_format(ctx, |platform| &platform.platform)
}

fn programmers_txt_format(ctx: &RuleContext<'_>) -> RuleOutput {
    optional_configuration_format(ctx, |platform| &platform.programmers)
}

fn optional_configuration_format(
    ctx: &RuleContext<'_>,
    file: impl FnOnce(&PlatformData) -> &ConfigurationFile,
) -> RuleOutput {
    let Some(platform) = ctx.data.platform() else {
        return RuleOutput::not_run("Not a platform");
    };
    let file = file(platform);
    if !file.exists() {
        return RuleOutput::skip("File not present");
    }
    configuration_format(file)
}

fn configuration_format(file: &ConfigurationFile) -> RuleOutput {
    match file.load_error() {
        Some(error) => RuleOutput::fail(error),
        None => RuleOutput::pass(),
    }
}
