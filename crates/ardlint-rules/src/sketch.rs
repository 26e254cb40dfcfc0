//! Sketch rules.

use crate::util::{
    dirs, fail_with_list, fail_with_path, files, incorrect_arduino_h_case, incorrect_case,
    missing_license_file, missing_readme, valid_base_name, MAX_PATH_BASE_NAME_LENGTH,
};
use ardlint_core::data::SketchMetadata;
use ardlint_core::{
    has_sketch_source_extension, Descriptor, Mode, ModeConfig, ProjectType, RuleContext,
    RuleOutput,
};

const README_CONFIG: ModeConfig = ModeConfig {
    disable: &[Mode::Permissive],
    enable: &[Mode::Default],
    info: &[],
    warning: &[Mode::Default],
    error: &[],
};

/// Only checked under strict compliance.
pub(crate) const LICENSE_CONFIG: ModeConfig = ModeConfig {
    disable: &[Mode::Default],
    enable: &[Mode::Strict],
    info: &[],
    warning: &[Mode::Default],
    error: &[],
};

pub(crate) const RULES: &[Descriptor] = &[
    Descriptor {
        id: "SS001",
        project_type: ProjectType::Sketch,
        category: "structure",
        subcategory: "primary sketch file",
        brief: "name mismatch",
        description: "The primary sketch file must be named after the sketch folder.",
        message_template: "Sketch file/folder name mismatch. The primary sketch file name must match the folder: {}",
        mode_config: ModeConfig::WARNING_STRICT_ERROR,
        disable_subproject: false,
        check: name_mismatch,
    },
    Descriptor {
        id: "SS002",
        project_type: ProjectType::Sketch,
        category: "structure",
        subcategory: "file name",
        brief: "prohibited characters in file name",
        description: "Sketch file names may only contain letters, digits, `_`, `.` and `-`, and must not start with `.` or `-`.",
        message_template: "Prohibited characters in file name(s): {}. The first character must be A-Z, a-z, 0-9 or _; the rest may also use . and -.",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: prohibited_characters_in_file_name,
    },
    Descriptor {
        id: "SS003",
        project_type: ProjectType::Sketch,
        category: "structure",
        subcategory: "file name",
        brief: "file name too long",
        description: "Sketch file names are limited to 63 characters, not counting the extension.",
        message_template: "File name(s): {} exceed the maximum length.",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: file_name_too_long,
    },
    Descriptor {
        id: "SS004",
        project_type: ProjectType::Sketch,
        category: "structure",
        subcategory: "file name",
        brief: ".pde extension",
        description: "The .pde extension is deprecated in favor of .ino.",
        message_template: "Sketch file(s) use the deprecated .pde extension: {}. Rename them to .ino.",
        mode_config: ModeConfig::WARNING_STRICT_ERROR,
        disable_subproject: false,
        check: pde_extension,
    },
    Descriptor {
        id: "SS005",
        project_type: ProjectType::Sketch,
        category: "structure",
        subcategory: "folder",
        brief: "incorrect src folder case",
        description: "The src subfolder is only compiled recursively when named in lower case.",
        message_template: "Incorrect src folder name case: {}. It must be named src.",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: incorrect_src_folder_case,
    },
    Descriptor {
        id: "SS006",
        project_type: ProjectType::Sketch,
        category: "structure",
        subcategory: "root folder",
        brief: "prohibited characters in folder name",
        description: "Sketch folder names may only contain letters, digits, `_`, `.` and `-`, and must not start with `.` or `-`.",
        message_template: "Prohibited characters in sketch folder name: {}.",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: prohibited_characters_in_folder_name,
    },
    Descriptor {
        id: "SS007",
        project_type: ProjectType::Sketch,
        category: "structure",
        subcategory: "root folder",
        brief: "folder name too long",
        description: "Sketch folder names are limited to 63 characters.",
        message_template: "Sketch folder name {} exceeds the maximum length.",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: folder_name_too_long,
    },
    Descriptor {
        id: "SM001",
        project_type: ProjectType::Sketch,
        category: "sketch.json",
        subcategory: "general",
        brief: "sketch.json JSON format",
        description: "The sketch.json metadata file must be valid JSON.",
        message_template: "sketch.json is not a valid JSON document: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: metadata_json_format,
    },
    Descriptor {
        id: "SD001",
        project_type: ProjectType::Sketch,
        category: "documentation",
        subcategory: "readme",
        brief: "missing readme",
        description: "A readme documents what the sketch does and how to use it.",
        message_template: "No readme found. Please document your sketch.",
        mode_config: README_CONFIG,
        disable_subproject: true,
        check: missing_readme,
    },
    Descriptor {
        id: "SD002",
        project_type: ProjectType::Sketch,
        category: "documentation",
        subcategory: "license",
        brief: "missing license file",
        description: "A license file in the sketch root tells users the terms of use.",
        message_template: "No license file found.",
        mode_config: LICENSE_CONFIG,
        disable_subproject: true,
        check: missing_license_file,
    },
    Descriptor {
        id: "SC001",
        project_type: ProjectType::Sketch,
        category: "code",
        subcategory: "miscellaneous",
        brief: "incorrect Arduino.h case",
        description: "Arduino.h must be included in the correct case to compile on case-sensitive filesystems.",
        message_template: "Incorrect case of Arduino.h in #include directive: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: incorrect_arduino_h_case,
    },
];

fn name_mismatch(ctx: &RuleContext<'_>) -> RuleOutput {
    match ctx.data.sketch().and_then(|s| s.main_file()) {
        Some(_) => RuleOutput::pass(),
        None => RuleOutput::fail(format!("{}.ino", ctx.data.folder_name())),
    }
}

fn prohibited_characters_in_file_name(ctx: &RuleContext<'_>) -> RuleOutput {
    let invalid: Vec<&str> = files(ctx.data.entries())
        .filter(|e| has_sketch_source_extension(&e.path) && !valid_base_name(&e.name))
        .map(|e| e.name.as_str())
        .collect();
    fail_with_list(&invalid)
}

fn file_name_too_long(ctx: &RuleContext<'_>) -> RuleOutput {
    let too_long: Vec<&str> = files(ctx.data.entries())
        .filter(|e| has_sketch_source_extension(&e.path))
        .filter(|e| {
            e.path
                .file_stem()
                .is_some_and(|stem| stem.to_string_lossy().chars().count() > MAX_PATH_BASE_NAME_LENGTH)
        })
        .map(|e| e.name.as_str())
        .collect();
    fail_with_list(&too_long)
}

fn pde_extension(ctx: &RuleContext<'_>) -> RuleOutput {
    let pde: Vec<&str> = files(ctx.data.entries())
        .filter(|e| e.path.extension().is_some_and(|ext| ext == "pde"))
        .map(|e| e.name.as_str())
        .collect();
    fail_with_list(&pde)
}

fn incorrect_src_folder_case(ctx: &RuleContext<'_>) -> RuleOutput {
    fail_with_path(incorrect_case(dirs(ctx.data.entries()), "src"))
}

fn prohibited_characters_in_folder_name(ctx: &RuleContext<'_>) -> RuleOutput {
    let name = ctx.data.folder_name();
    if valid_base_name(&name) {
        RuleOutput::pass()
    } else {
        RuleOutput::fail(name)
    }
}

fn folder_name_too_long(ctx: &RuleContext<'_>) -> RuleOutput {
    let name = ctx.data.folder_name();
    if name.chars().count() > MAX_PATH_BASE_NAME_LENGTH {
        RuleOutput::fail(name)
    } else {
        RuleOutput::pass()
    }
}

fn metadata_json_format(ctx: &RuleContext<'_>) -> RuleOutput {
    match ctx.data.sketch().map(|s| s.metadata()) {
        Some(SketchMetadata::Parsed(_)) => RuleOutput::pass(),
        Some(SketchMetadata::Invalid(error)) => RuleOutput::fail(error.clone()),
        Some(SketchMetadata::Absent) | None => RuleOutput::skip("No metadata file"),
    }
}
