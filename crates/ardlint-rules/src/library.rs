//! Library structure and documentation rules.

use crate::util::{
    dirs, fail_with_list, fail_with_path, files, incorrect_arduino_h_case, incorrect_case,
    misspelled_name, missing_license_file, missing_readme, sanitize_name, under_top_level,
    valid_base_name, MAX_PATH_BASE_NAME_LENGTH,
};
use ardlint_core::data::Layout;
use ardlint_core::{
    has_header_extension, has_main_sketch_extension, Descriptor, Mode, ModeConfig, ProjectType,
    RuleContext, RuleOutput, EXAMPLES_FOLDER_NAMES, LIBRARY_METADATA_FILE,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static EXTRAS_MISSPELLING: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)^extra$").expect("valid regex"));

static EXAMPLES_MISSPELLING: Lazy<Regex> = Lazy::new(|| {
    Regex::new("(?i)^e((x)|(xs)|(s))((am)|(ma))p((le)|(el))s?$").expect("valid regex")
});

static METADATA_MISSPELLING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^librar((y)|(ie))s?[.\-_]?propert((y)|(ie))s?$").expect("valid regex")
});

/// Folders where sketches are expected in a library.
const SKETCH_FOLDERS: [&str; 2] = ["examples", "extras"];

const METADATA_MISSING_CONFIG: ModeConfig = ModeConfig {
    disable: &[],
    enable: &[Mode::Default],
    info: &[],
    warning: &[Mode::Default],
    error: &[
        Mode::Strict,
        Mode::LibraryManagerSubmission,
        Mode::LibraryManagerIndexed,
        Mode::LibraryManagerIndexing,
    ],
};

pub(crate) const STRUCTURE_RULES: &[Descriptor] = &[
    Descriptor {
        id: "LS001",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "general",
        brief: "invalid library",
        description: "A library must have a header file in its source folder and loadable metadata.",
        message_template: "Path does not contain a valid Arduino library.",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: invalid_library,
    },
    Descriptor {
        id: "LS002",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "root folder",
        brief: "folder name too long",
        description: "Library folder names are limited to 63 characters.",
        message_template: "Library folder name {} exceeds the maximum length.",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: folder_name_too_long,
    },
    Descriptor {
        id: "LS003",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "root folder",
        brief: "prohibited characters in folder name",
        description: "Library folder names may only contain letters, digits, `_`, `.` and `-`, and must not start with `.` or `-`.",
        message_template: "Prohibited characters in folder name: {}.",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: prohibited_characters_in_folder_name,
    },
    Descriptor {
        id: "LS004",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "miscellaneous",
        brief: ".gitmodules present",
        description: "Library Manager releases do not include git submodules.",
        message_template: "Git submodule detected. Library Manager installations will not contain submodule content.",
        mode_config: ModeConfig::LIBRARY_MANAGER,
        disable_subproject: false,
        check: has_submodule,
    },
    Descriptor {
        id: "LS005",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "miscellaneous",
        brief: "symlink",
        description: "Symbolic links are not allowed in Library Manager releases.",
        message_template: "Symlink(s) found: {}. These are not allowed in the Library Manager.",
        mode_config: ModeConfig::LIBRARY_MANAGER,
        disable_subproject: false,
        check: contains_symlinks,
    },
    Descriptor {
        id: "LS006",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "miscellaneous",
        brief: ".development file",
        description: "A .development file marks a library that is not ready for Library Manager releases.",
        message_template: ".development file found. Remove it to allow Library Manager releases.",
        mode_config: ModeConfig::LIBRARY_MANAGER,
        disable_subproject: false,
        check: has_dot_development_file,
    },
    Descriptor {
        id: "LS007",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "miscellaneous",
        brief: ".exe file",
        description: "Executable files are not allowed in Library Manager releases.",
        message_template: ".exe file(s) found: {}. These are not allowed in the Library Manager.",
        mode_config: ModeConfig::LIBRARY_MANAGER,
        disable_subproject: false,
        check: has_exe,
    },
    Descriptor {
        id: "LS008",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "miscellaneous",
        brief: "no header matches library name",
        description: "A header named after the library lets tools add the #include directive.",
        message_template: "No header file found matching library name ({}). Best practice is for the primary header to be named after the library.",
        mode_config: ModeConfig::INFO_STRICT_WARNING,
        disable_subproject: false,
        check: name_header_mismatch,
    },
    Descriptor {
        id: "LS009",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "miscellaneous",
        brief: "incorrect src folder case",
        description: "Recursive layout libraries keep their sources in a folder named src.",
        message_template: "Incorrect src folder name case: {}. It must be named src.",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: incorrect_src_folder_case,
    },
    Descriptor {
        id: "LS010",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "miscellaneous",
        brief: "recursive layout with utility folder",
        description: "The utility folder is only compiled for flat layout libraries.",
        message_template: "utility folder found in a recursive layout library. Move its contents under src.",
        mode_config: ModeConfig::WARNING,
        disable_subproject: false,
        check: recursive_with_utility_folder,
    },
    Descriptor {
        id: "LS011",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "miscellaneous",
        brief: "misspelled extras folder",
        description: "The extras folder is not compiled and not scanned for sketches.",
        message_template: "Potentially misspelled extras folder name found: {}. It must be named extras.",
        mode_config: ModeConfig::WARNING_STRICT_ERROR,
        disable_subproject: false,
        check: misspelled_extras_folder,
    },
    Descriptor {
        id: "LS012",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "miscellaneous",
        brief: "incorrect extras folder case",
        description: "The extras folder is only recognized when named in lower case.",
        message_template: "Incorrect extras folder name case: {}. It must be named extras.",
        mode_config: ModeConfig::WARNING_STRICT_ERROR,
        disable_subproject: false,
        check: incorrect_extras_folder_case,
    },
    Descriptor {
        id: "LS013",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "miscellaneous",
        brief: "stray sketch",
        description: "Sketches belong in the examples or extras folder.",
        message_template: "Sketch(es) found outside the examples and extras folders: {}",
        mode_config: ModeConfig::WARNING_STRICT_ERROR,
        disable_subproject: false,
        check: stray_sketches,
    },
    Descriptor {
        id: "LS014",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "examples",
        brief: "no examples",
        description: "Example sketches show users how to use the library.",
        message_template: "No example sketches found. Please provide examples.",
        mode_config: ModeConfig::WARNING_STRICT_ERROR,
        disable_subproject: true,
        check: missing_examples,
    },
    Descriptor {
        id: "LS015",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "examples",
        brief: "misspelled examples folder",
        description: "Example sketches are only listed by the IDE from a folder named examples.",
        message_template: "Potentially misspelled examples folder name found: {}. It must be named examples.",
        mode_config: ModeConfig::WARNING_STRICT_ERROR,
        disable_subproject: false,
        check: misspelled_examples_folder,
    },
    Descriptor {
        id: "LS016",
        project_type: ProjectType::Library,
        category: "structure",
        subcategory: "examples",
        brief: "incorrect examples folder case",
        description: "The examples folder is only recognized when named in lower case.",
        message_template: "Incorrect examples folder name case: {}. It must be named examples.",
        mode_config: ModeConfig::WARNING_STRICT_ERROR,
        disable_subproject: false,
        check: incorrect_examples_folder_case,
    },
    Descriptor {
        id: "LP001",
        project_type: ProjectType::Library,
        category: "library.properties",
        subcategory: "general",
        brief: "missing library.properties",
        description: "library.properties holds the metadata the IDE and Library Manager need.",
        message_template: "library.properties not found. Please add one.",
        mode_config: METADATA_MISSING_CONFIG,
        disable_subproject: false,
        check: metadata_missing,
    },
    Descriptor {
        id: "LP002",
        project_type: ProjectType::Library,
        category: "library.properties",
        subcategory: "general",
        brief: "misspelled library.properties file name",
        description: "The metadata file is only recognized when named library.properties.",
        message_template: "Potentially misspelled library.properties file name found: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: misspelled_metadata_file,
    },
    Descriptor {
        id: "LP003",
        project_type: ProjectType::Library,
        category: "library.properties",
        subcategory: "general",
        brief: "incorrect library.properties file name case",
        description: "The metadata file is only recognized when named in lower case.",
        message_template: "Incorrect library.properties file name case: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: incorrect_metadata_file_case,
    },
    Descriptor {
        id: "LP004",
        project_type: ProjectType::Library,
        category: "library.properties",
        subcategory: "general",
        brief: "redundant library.properties",
        description: "Only the library.properties in the library root is used.",
        message_template: "Redundant library.properties file found at {}. Remove it.",
        mode_config: ModeConfig::WARNING_STRICT_ERROR,
        disable_subproject: false,
        check: redundant_metadata_file,
    },
    Descriptor {
        id: "LP005",
        project_type: ProjectType::Library,
        category: "library.properties",
        subcategory: "general",
        brief: "invalid library.properties format",
        description: "library.properties must be a list of key=value lines.",
        message_template: "library.properties has an invalid format: {}",
        mode_config: ModeConfig::ERROR,
        disable_subproject: false,
        check: metadata_format,
    },
];

pub(crate) const DOCUMENTATION_RULES: &[Descriptor] = &[
    Descriptor {
        id: "LD001",
        project_type: ProjectType::Library,
        category: "documentation",
        subcategory: "readme",
        brief: "missing readme",
        description: "A readme documents what the library does and how to use it.",
        message_template: "No readme found. Please document your library.",
        mode_config: ModeConfig::WARNING_STRICT_ERROR,
        disable_subproject: true,
        check: missing_readme,
    },
    Descriptor {
        id: "LD002",
        project_type: ProjectType::Library,
        category: "documentation",
        subcategory: "license",
        brief: "missing license file",
        description: "A license file in the library root tells users the terms of use.",
        message_template: "No license file found.",
        mode_config: ModeConfig::WARNING,
        disable_subproject: true,
        check: missing_license_file,
    },
    Descriptor {
        id: "LC001",
        project_type: ProjectType::Library,
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

fn invalid_library(ctx: &RuleContext<'_>) -> RuleOutput {
    match ctx.data.library() {
        Some(library) if library.is_loaded() && !library.source_headers().is_empty() => {
            RuleOutput::pass()
        }
        _ => RuleOutput::fail(""),
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

fn prohibited_characters_in_folder_name(ctx: &RuleContext<'_>) -> RuleOutput {
    let name = ctx.data.folder_name();
    if valid_base_name(&name) {
        RuleOutput::pass()
    } else {
        RuleOutput::fail(name)
    }
}

fn root_file_present(ctx: &RuleContext<'_>, name: &str) -> RuleOutput {
    if files(ctx.data.entries()).any(|e| e.name == name) {
        RuleOutput::fail("")
    } else {
        RuleOutput::pass()
    }
}

fn has_submodule(ctx: &RuleContext<'_>) -> RuleOutput {
    root_file_present(ctx, ".gitmodules")
}

fn contains_symlinks(ctx: &RuleContext<'_>) -> RuleOutput {
    let symlinks: Vec<String> = ctx
        .data
        .tree()
        .iter()
        .filter(|e| e.is_symlink)
        .map(|e| e.path.display().to_string())
        .collect();
    fail_with_list(&symlinks)
}

fn has_dot_development_file(ctx: &RuleContext<'_>) -> RuleOutput {
    root_file_present(ctx, ".development")
}

fn has_exe(ctx: &RuleContext<'_>) -> RuleOutput {
    let executables: Vec<String> = files(ctx.data.tree())
        .filter(|e| e.path.extension().is_some_and(|ext| ext == "exe"))
        .map(|e| e.path.display().to_string())
        .collect();
    fail_with_list(&executables)
}

fn name_header_mismatch(ctx: &RuleContext<'_>) -> RuleOutput {
    let Some(library) = ctx.data.library().filter(|l| l.is_loaded()) else {
        return RuleOutput::not_run("Couldn't load library.properties");
    };
    let Some(name) = library.properties().get("name") else {
        return RuleOutput::not_run("Field not present");
    };

    let sanitized = sanitize_name(name);
    let matched = library.source_headers().iter().any(|header| {
        Path::new(header)
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy() == sanitized)
    });
    if matched {
        RuleOutput::pass()
    } else {
        RuleOutput::fail(format!("{sanitized}.h"))
    }
}

fn incorrect_src_folder_case(ctx: &RuleContext<'_>) -> RuleOutput {
    let root = ctx.data.entries();
    let has_metadata = files(root).any(|e| e.name == LIBRARY_METADATA_FILE);
    let has_root_header = files(root).any(|e| has_header_extension(&e.path));
    if has_metadata && has_root_header {
        return RuleOutput::skip("Not applicable due to layout type");
    }

    fail_with_path(incorrect_case(dirs(root), "src"))
}

fn recursive_with_utility_folder(ctx: &RuleContext<'_>) -> RuleOutput {
    let Some(library) = ctx.data.library().filter(|l| l.is_loaded()) else {
        return RuleOutput::not_run("Library not loaded");
    };
    if library.layout() == Layout::Flat {
        return RuleOutput::skip("Not applicable due to layout type");
    }

    if dirs(ctx.data.entries()).any(|e| e.name == "utility") {
        RuleOutput::fail("")
    } else {
        RuleOutput::pass()
    }
}

fn misspelled_extras_folder(ctx: &RuleContext<'_>) -> RuleOutput {
    fail_with_path(misspelled_name(
        dirs(ctx.data.entries()),
        "extras",
        &EXTRAS_MISSPELLING,
    ))
}

fn incorrect_extras_folder_case(ctx: &RuleContext<'_>) -> RuleOutput {
    fail_with_path(incorrect_case(dirs(ctx.data.entries()), "extras"))
}

fn stray_sketches(ctx: &RuleContext<'_>) -> RuleOutput {
    let root = ctx.data.folder();
    let mut stray: Vec<String> = Vec::new();
    for sketch in files(ctx.data.tree()).filter(|e| has_main_sketch_extension(&e.path)) {
        if under_top_level(root, &sketch.path, &SKETCH_FOLDERS) {
            continue;
        }
        let folder = sketch.path.parent().unwrap_or(root).display().to_string();
        if !stray.contains(&folder) {
            stray.push(folder);
        }
    }
    fail_with_list(&stray)
}

fn missing_examples(ctx: &RuleContext<'_>) -> RuleOutput {
    let root = ctx.data.folder();
    let has_example = files(ctx.data.tree())
        .filter(|e| has_main_sketch_extension(&e.path))
        .any(|sketch| {
            // Example sketches live in their own folder below the examples folder.
            sketch.path.strip_prefix(root).is_ok_and(|relative| {
                let mut components = relative.components();
                let in_examples = components
                    .next()
                    .is_some_and(|first| EXAMPLES_FOLDER_NAMES.iter().any(|n| first.as_os_str() == *n));
                in_examples && components.count() >= 2
            })
        });

    if has_example {
        RuleOutput::pass()
    } else {
        RuleOutput::fail("")
    }
}

fn misspelled_examples_folder(ctx: &RuleContext<'_>) -> RuleOutput {
    fail_with_path(misspelled_name(
        dirs(ctx.data.entries()),
        "examples",
        &EXAMPLES_MISSPELLING,
    ))
}

fn incorrect_examples_folder_case(ctx: &RuleContext<'_>) -> RuleOutput {
    fail_with_path(incorrect_case(dirs(ctx.data.entries()), "examples"))
}

fn metadata_missing(ctx: &RuleContext<'_>) -> RuleOutput {
    match ctx.data.library() {
        None => RuleOutput::not_run("Couldn't load library."),
        Some(library) if library.is_legacy() => RuleOutput::fail(""),
        Some(_) => RuleOutput::pass(),
    }
}

fn misspelled_metadata_file(ctx: &RuleContext<'_>) -> RuleOutput {
    fail_with_path(misspelled_name(
        files(ctx.data.entries()),
        LIBRARY_METADATA_FILE,
        &METADATA_MISSPELLING,
    ))
}

fn incorrect_metadata_file_case(ctx: &RuleContext<'_>) -> RuleOutput {
    fail_with_path(incorrect_case(files(ctx.data.entries()), LIBRARY_METADATA_FILE))
}

fn redundant_metadata_file(ctx: &RuleContext<'_>) -> RuleOutput {
    let redundant = ctx.data.folder().join("src").join(LIBRARY_METADATA_FILE);
    if ctx.capabilities.fs.exists(&redundant) {
        RuleOutput::fail(redundant.display().to_string())
    } else {
        RuleOutput::pass()
    }
}

fn metadata_format(ctx: &RuleContext<'_>) -> RuleOutput {
    match ctx.data.library() {
        Some(library) if library.is_legacy() => {
            RuleOutput::skip("Library has no library.properties")
        }
        Some(library) => library
            .load_error()
            .map_or_else(RuleOutput::pass, RuleOutput::fail),
        None => RuleOutput::not_run("Couldn't load library."),
    }
}
