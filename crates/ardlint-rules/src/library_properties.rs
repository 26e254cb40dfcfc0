//! `library.properties` field rules.

use crate::util::{
    comma_separated, fail_with_list, field_missing, shorter_than, spell_check_field, with_field,
    with_optional_field, with_properties,
};
use ardlint_core::data::{GitData, Layout};
use ardlint_core::version::{is_strict, parse_relaxed};
use ardlint_core::{Descriptor, Mode, ModeConfig, ProjectType, RuleContext, RuleOutput};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

const CATEGORY: &str = "library.properties";

/// Maximum length of `name`.
const NAME_MAX_LENGTH: usize = 63;

/// Recommended maximum length of `name`.
const NAME_RECOMMENDED_MAX_LENGTH: usize = 16;

const LDFLAGS_MIN_LENGTH: usize = 3;

const VALID_CATEGORIES: [&str; 10] = [
    "Display",
    "Communication",
    "Signal Input/Output",
    "Sensors",
    "Device Control",
    "Timing",
    "Data Storage",
    "Data Processing",
    "Other",
    "Uncategorized",
];

/// Vendor names used in place of an Arduino architecture, with the
/// architectures they stand for. Keys are lower case.
const ARCHITECTURE_ALIASES: [(&str, &[&str]); 8] = [
    ("atmelavr", &["avr"]),
    ("atmelmegaavr", &["megaavr"]),
    ("atmelsam", &["sam", "samd"]),
    ("espressif32", &["esp32"]),
    ("espressif8266", &["esp8266"]),
    ("intel_arc32", &["arc32"]),
    ("nordicnrf52", &["nRF5", "nrf52", "mbed", "mbed_edge", "mbed_nano"]),
    ("raspberrypi", &["mbed_nano", "mbed_rp2040", "rp2040"]),
];

const COMMON_ARCHITECTURES: [&str; 22] = [
    "apollo3",
    "arc32",
    "avr",
    "esp32",
    "esp8266",
    "i586",
    "i686",
    "k210",
    "mbed",
    "mbed_edge",
    "mbed_nano",
    "mbed_portenta",
    "mbed_rp2040",
    "megaavr",
    "mraa",
    "nRF5",
    "nrf52",
    "pic32",
    "sam",
    "samd",
    "wiced",
    "win10",
];

const NAME_PATTERN: &str =
    r"(([a-zA-Z][a-zA-Z0-9 _.\-]*)|([0-9][a-zA-Z0-9 _.\-]*[a-zA-Z][a-zA-Z0-9 _.\-]*))";

static NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{NAME_PATTERN}$")).expect("valid regex"));

static DEPENDS: Lazy<Regex> = Lazy::new(|| {
    let item = format!(r"({NAME_PATTERN}+( \(.*\) *)?)");
    Regex::new(&format!(r"^(({item}, *)*{item})?$")).expect("valid regex")
});

static STARTS_WITH_ARDUINO: Lazy<Regex> =
    Lazy::new(|| Regex::new("^(?i:arduino)").expect("valid regex"));

static CONTAINS_ARDUINO: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i:arduino)").expect("valid regex"));

/// Misspellings of the optional fields, paired with the correct key.
static OPTIONAL_FIELD_MISSPELLINGS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        ("(?i)^depends?$", "depends"),
        ("(?i)^dot[-_]?a[-_]?linkages?$", "dot_a_linkage"),
        ("(?i)^includes?$", "includes"),
        ("(?i)^pre[-_]?compiled?$", "precompiled"),
        ("(?i)^ld[-_]?flags?$", "ldflags"),
    ]
    .into_iter()
    .map(|(pattern, key)| (Regex::new(pattern).expect("valid regex"), key))
    .collect()
});

const ARDUINO_PREFIX_CONFIG: ModeConfig = ModeConfig {
    disable: &[Mode::Official],
    enable: &[Mode::Default],
    info: &[],
    warning: &[Mode::Default],
    error: &[Mode::LibraryManagerSubmission],
};

const OFFICIAL_PREFIX_CONFIG: ModeConfig = ModeConfig {
    disable: &[Mode::Default],
    enable: &[Mode::Official],
    info: &[],
    warning: &[Mode::Default],
    error: &[Mode::LibraryManagerIndexed],
};

const CONTAINS_ARDUINO_CONFIG: ModeConfig = ModeConfig {
    disable: &[Mode::Official],
    enable: &[Mode::Default],
    info: &[Mode::Default],
    warning: &[Mode::Strict],
    error: &[],
};

const SUBMISSION_CONFIG: ModeConfig = ModeConfig {
    disable: &[Mode::Default],
    enable: &[Mode::LibraryManagerSubmission],
    info: &[],
    warning: &[],
    error: &[Mode::Default],
};

const INDEXED_CONFIG: ModeConfig = ModeConfig {
    disable: &[Mode::Default],
    enable: &[Mode::LibraryManagerIndexed],
    info: &[],
    warning: &[],
    error: &[Mode::Default],
};

const BEHIND_TAG_CONFIG: ModeConfig = ModeConfig {
    disable: &[],
    enable: &[Mode::Default],
    info: &[],
    warning: &[Mode::Default],
    error: &[Mode::Strict, Mode::LibraryManagerIndexed],
};

const CATEGORY_INVALID_CONFIG: ModeConfig = ModeConfig {
    disable: &[],
    enable: &[Mode::Default],
    info: &[],
    warning: &[Mode::Permissive],
    error: &[Mode::Default],
};

const DEPENDS_INDEX_CONFIG: ModeConfig = ModeConfig {
    disable: &[],
    enable: &[Mode::Default],
    info: &[],
    warning: &[Mode::Default],
    error: &[
        Mode::LibraryManagerSubmission,
        Mode::LibraryManagerIndexed,
        Mode::LibraryManagerIndexing,
    ],
};

/// Builds a field rule descriptor; every rule here shares the category.
macro_rules! field_rule {
    (
        $id:literal, $subcategory:literal, $brief:literal, $description:literal,
        $message:literal, $config:expr, $check:expr $(, subproject_disabled = $sub:literal)?
    ) => {
        Descriptor {
            id: $id,
            project_type: ProjectType::Library,
            category: CATEGORY,
            subcategory: $subcategory,
            brief: $brief,
            description: $description,
            message_template: $message,
            mode_config: $config,
            disable_subproject: field_rule!(@sub $($sub)?),
            check: $check,
        }
    };
    (@sub) => { false };
    (@sub $sub:literal) => { $sub };
}

pub(crate) const RULES: &[Descriptor] = &[
    field_rule!(
        "LP006", "name field", "missing name field",
        "The name field identifies the library.",
        "missing required name field in library.properties",
        ModeConfig::ERROR, name_missing
    ),
    field_rule!(
        "LP007", "name field", "name too short",
        "The name field must not be empty.",
        "library.properties name value is less than the minimum length.",
        ModeConfig::ERROR, name_too_short
    ),
    field_rule!(
        "LP008", "name field", "name too long",
        "The name field is limited to 63 characters.",
        "library.properties name value {} is longer than the maximum length.",
        ModeConfig::ERROR, name_too_long
    ),
    field_rule!(
        "LP009", "name field", "name longer than recommended",
        "Names of 16 characters or less display fully in the IDE.",
        "library.properties name value {} is longer than the recommended length of 16 characters.",
        ModeConfig::WARNING_STRICT_ERROR, name_longer_than_recommended
    ),
    field_rule!(
        "LP010", "name field", "disallowed characters in name",
        "The name must start with a letter or number and contain only letters, numbers, spaces, `_`, `.` and `-`.",
        "disallowed characters in library.properties name value: {}.",
        ModeConfig::ERROR, name_disallowed_characters
    ),
    field_rule!(
        "LP011", "name field", "name starts with \"Arduino\"",
        "Names starting with \"Arduino\" are reserved for official libraries.",
        "Library name {} starts with \"Arduino\". This prefix is reserved for official Arduino libraries.",
        ARDUINO_PREFIX_CONFIG, name_starts_with_arduino
    ),
    field_rule!(
        "LP012", "name field", "missing \"Arduino_\" prefix",
        "Official Arduino libraries use the \"Arduino_\" name prefix.",
        "Library name {} is missing the \"Arduino_\" prefix. All new official library names must use this prefix.",
        OFFICIAL_PREFIX_CONFIG, name_missing_official_prefix
    ),
    field_rule!(
        "LP013", "name field", "name contains \"Arduino\"",
        "\"Arduino\" in a name is redundant in the Library Manager.",
        "library.properties name value {} contains \"Arduino\". This is superfluous.",
        CONTAINS_ARDUINO_CONFIG, name_contains_arduino
    ),
    field_rule!(
        "LP014", "name field", "name has spaces",
        "Spaces in names are replaced by `_` in installation folders.",
        "library.properties name value {} contains spaces. Best practice is using underscores.",
        ModeConfig::INFO_STRICT_WARNING, name_has_spaces
    ),
    field_rule!(
        "LP015", "name field", "name contains \"library\"",
        "\"library\" in a library name is redundant.",
        "library.properties name value {} contains \"library\". This is superfluous.",
        ModeConfig::INFO_STRICT_WARNING, name_contains_library
    ),
    field_rule!(
        "LP016", "name field", "name in use",
        "A new library must not reuse the name of a library already in the Library Manager index.",
        "Library name {} is already in use in the Library Manager index. Each library must have a unique name.",
        SUBMISSION_CONFIG, name_duplicate, subproject_disabled = true
    ),
    field_rule!(
        "LP017", "name field", "name not in index",
        "Changing the name of an indexed library stops updates from reaching its users.",
        "Library name {} not found in the Library Manager index. Library names are not allowed to change after being added to the index.",
        INDEXED_CONFIG, name_not_in_index, subproject_disabled = true
    ),
    field_rule!(
        "LP018", "version field", "missing version field",
        "The version field is required.",
        "missing required version field in library.properties",
        ModeConfig::ERROR, version_missing
    ),
    field_rule!(
        "LP019", "version field", "invalid version",
        "The version must be a semantic version; `1.2` style short forms are accepted.",
        "library.properties version value {} is not compliant with the semver specification.",
        ModeConfig::ERROR, version_not_relaxed_semver
    ),
    field_rule!(
        "LP020", "version field", "non-semver version",
        "Complete semantic versions (MAJOR.MINOR.PATCH) are recommended.",
        "library.properties version value {} is not compliant with the semver specification.",
        ModeConfig::INFO_STRICT_WARNING, version_not_strict_semver
    ),
    field_rule!(
        "LP021", "version field", "tag mismatch",
        "The version must be bumped before a release tag is made.",
        "The latest git tag appears to be greater than the library.properties version value: {}",
        BEHIND_TAG_CONFIG, version_behind_tag, subproject_disabled = true
    ),
    field_rule!(
        "LP022", "author field", "missing author field",
        "The author field is required.",
        "missing required author field in library.properties",
        ModeConfig::ERROR, author_missing
    ),
    field_rule!(
        "LP023", "author field", "author too short",
        "The author field must not be empty.",
        "library.properties author value is less than the minimum length.",
        ModeConfig::ERROR, author_too_short
    ),
    field_rule!(
        "LP024", "maintainer field", "missing maintainer field",
        "The maintainer field is required.",
        "missing required maintainer field in library.properties",
        ModeConfig::ERROR, maintainer_missing
    ),
    field_rule!(
        "LP025", "maintainer field", "maintainer too short",
        "The maintainer field must not be empty.",
        "library.properties maintainer value is less than the minimum length.",
        ModeConfig::ERROR, maintainer_too_short
    ),
    field_rule!(
        "LP026", "maintainer field", "maintainer starts with \"Arduino\"",
        "Only official libraries are maintained by Arduino.",
        "library.properties maintainer value {} starts with \"Arduino\". 3rd party libraries are not maintained by Arduino.",
        ARDUINO_PREFIX_CONFIG, maintainer_starts_with_arduino
    ),
    field_rule!(
        "LP027", "email field", "use of email field",
        "The email field is a deprecated alias of maintainer.",
        "Use of undocumented email field in library.properties. Please use the maintainer field instead.",
        ModeConfig::WARNING, email_as_maintainer_alias
    ),
    field_rule!(
        "LP028", "email field", "email too short",
        "The email field must not be empty when used in place of maintainer.",
        "library.properties email value is less than the minimum length.",
        ModeConfig::ERROR, email_too_short
    ),
    field_rule!(
        "LP029", "email field", "email starts with \"Arduino\"",
        "Only official libraries are maintained by Arduino.",
        "library.properties email value {} starts with \"Arduino\". 3rd party libraries are not maintained by Arduino.",
        ARDUINO_PREFIX_CONFIG, email_starts_with_arduino
    ),
    field_rule!(
        "LP030", "sentence field", "missing sentence field",
        "The sentence field is required.",
        "missing required sentence field in library.properties",
        ModeConfig::ERROR, sentence_missing
    ),
    field_rule!(
        "LP031", "sentence field", "sentence too short",
        "The sentence field must not be empty.",
        "library.properties sentence value is less than the minimum length.",
        ModeConfig::ERROR, sentence_too_short
    ),
    field_rule!(
        "LP032", "sentence field", "sentence spelling",
        "Checks the sentence for commonly misspelled words.",
        "A commonly misspelled word was found in the library.properties sentence field. Suggested correction: {}",
        ModeConfig::WARNING, sentence_spell_check
    ),
    field_rule!(
        "LP033", "paragraph field", "missing paragraph field",
        "The paragraph field is required.",
        "missing required paragraph field in library.properties",
        ModeConfig::WARNING_STRICT_ERROR, paragraph_missing
    ),
    field_rule!(
        "LP034", "paragraph field", "paragraph spelling",
        "Checks the paragraph for commonly misspelled words.",
        "A commonly misspelled word was found in the library.properties paragraph field. Suggested correction: {}",
        ModeConfig::WARNING, paragraph_spell_check
    ),
    field_rule!(
        "LP035", "paragraph field", "paragraph repeats sentence",
        "The IDE shows the paragraph right after the sentence.",
        "The library.properties paragraph field repeats the sentence field. These are displayed together so redundancy is not needed.",
        ModeConfig::WARNING_STRICT_ERROR, paragraph_repeats_sentence
    ),
    field_rule!(
        "LP036", "category field", "missing category field",
        "The category field sorts the library in the Library Manager.",
        "missing category field in library.properties",
        ModeConfig::WARNING_STRICT_ERROR, category_missing
    ),
    field_rule!(
        "LP037", "category field", "invalid category",
        "The category must be one of the documented values.",
        "invalid category field value {} in library.properties",
        CATEGORY_INVALID_CONFIG, category_invalid
    ),
    field_rule!(
        "LP038", "category field", "\"Uncategorized\" category",
        "The Uncategorized category is meant only for legacy libraries.",
        "Use of category field value \"Uncategorized\" in library.properties. Please use one of the specific categories.",
        ModeConfig::WARNING_STRICT_ERROR, category_uncategorized
    ),
    field_rule!(
        "LP039", "url field", "missing url field",
        "The url field is required.",
        "missing required url field in library.properties",
        ModeConfig::ERROR, url_missing
    ),
    field_rule!(
        "LP040", "url field", "url too short",
        "The url field must not be empty.",
        "library.properties url value is less than the minimum length.",
        ModeConfig::ERROR, url_too_short
    ),
    field_rule!(
        "LP041", "url field", "invalid url",
        "The url must be an absolute URL.",
        "library.properties url value {} does not have a valid URL format.",
        ModeConfig::ERROR, url_invalid
    ),
    field_rule!(
        "LP042", "url field", "dead url",
        "The url is requested once and must answer 200 OK.",
        "Unable to load the library.properties url field: {}",
        ModeConfig::WARNING, url_dead_link
    ),
    field_rule!(
        "LP043", "architectures field", "missing architectures field",
        "Without architectures the library is assumed to support all boards.",
        "missing architectures field in library.properties",
        ModeConfig::WARNING_STRICT_ERROR, architectures_missing
    ),
    field_rule!(
        "LP044", "architectures field", "architectures too short",
        "The architectures field must not be empty.",
        "library.properties architectures value is less than the minimum length.",
        ModeConfig::ERROR, architectures_too_short
    ),
    field_rule!(
        "LP045", "architectures field", "architecture alias",
        "Vendor names are not recognized as architectures unless the real name is also listed.",
        "Alias(es) of an Arduino architecture found without the true name: {}. Use the architecture name from the boards platform.",
        ModeConfig::WARNING_STRICT_ERROR, architectures_solo_alias
    ),
    field_rule!(
        "LP046", "architectures field", "incorrect architecture case",
        "Architecture names are case sensitive.",
        "Incorrect case of library.properties architectures item(s): {}. Architecture names are case sensitive.",
        ModeConfig::WARNING_STRICT_ERROR, architectures_value_case
    ),
    field_rule!(
        "LP047", "depends field", "disallowed characters in depends",
        "depends is a comma separated list of library names with optional version constraints.",
        "disallowed characters in library.properties depends value: {}.",
        ModeConfig::ERROR, depends_disallowed_characters
    ),
    field_rule!(
        "LP048", "depends field", "dependency not in index",
        "Dependencies are installed from the Library Manager index.",
        "library.properties depends field item(s) {} not found in the Library Manager index.",
        DEPENDS_INDEX_CONFIG, depends_not_in_index
    ),
    field_rule!(
        "LP049", "depends field", "invalid version constraint",
        "Version constraints use the operators =, >, >=, <, <=, ^ and ~ combined with &&, || and !.",
        "Invalid version constraint syntax in library.properties depends field: {}",
        ModeConfig::ERROR, depends_constraint_invalid
    ),
    field_rule!(
        "LP050", "dot_a_linkage field", "invalid dot_a_linkage",
        "dot_a_linkage is either true or false.",
        "invalid dot_a_linkage value {} in library.properties. It must be true or false.",
        ModeConfig::ERROR, dot_a_linkage_invalid
    ),
    field_rule!(
        "LP051", "dot_a_linkage field", "dot_a_linkage with flat layout",
        "dot_a_linkage only works with the recursive layout.",
        "library.properties dot_a_linkage field enabled but library is not in the recursive layout.",
        ModeConfig::ERROR, dot_a_linkage_with_flat_layout
    ),
    field_rule!(
        "LP052", "includes field", "includes too short",
        "The includes field must not be empty.",
        "library.properties includes value is less than the minimum length.",
        ModeConfig::ERROR, includes_too_short
    ),
    field_rule!(
        "LP053", "includes field", "includes file not found",
        "Each header listed in includes must be in the library source folder.",
        "library.properties includes field item(s) {} not found in library.",
        ModeConfig::WARNING_STRICT_ERROR, includes_item_not_found
    ),
    field_rule!(
        "LP054", "precompiled field", "invalid precompiled",
        "precompiled is one of true, full or false.",
        "invalid precompiled value {} in library.properties. It must be true, full or false.",
        ModeConfig::ERROR, precompiled_invalid
    ),
    field_rule!(
        "LP055", "precompiled field", "precompiled with flat layout",
        "Precompiled binaries are only found with the recursive layout.",
        "library.properties precompiled field value {} is enabled but library is not in the recursive layout.",
        ModeConfig::WARNING_STRICT_ERROR, precompiled_with_flat_layout
    ),
    field_rule!(
        "LP056", "ldflags field", "ldflags too short",
        "ldflags must hold at least one linker flag.",
        "library.properties ldflags value is less than the minimum length.",
        ModeConfig::ERROR, ldflags_too_short
    ),
    field_rule!(
        "LP057", "general", "misspelled optional field",
        "Misspelled optional fields are silently ignored.",
        "library.properties optional field name(s) misspelled: {}",
        ModeConfig::WARNING_STRICT_ERROR, misspelled_optional_field
    ),
];

fn fail_if(condition: bool, detail: &str) -> RuleOutput {
    if condition {
        RuleOutput::fail(detail)
    } else {
        RuleOutput::pass()
    }
}

fn name_missing(ctx: &RuleContext<'_>) -> RuleOutput {
    field_missing(ctx, "name")
}

fn name_too_short(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "name", |name| shorter_than(name, 1))
}

fn name_too_long(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "name", |name| {
        fail_if(name.chars().count() > NAME_MAX_LENGTH, name)
    })
}

fn name_longer_than_recommended(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "name", |name| {
        fail_if(name.chars().count() > NAME_RECOMMENDED_MAX_LENGTH, name)
    })
}

fn name_disallowed_characters(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "name", |name| {
        fail_if(!name.is_empty() && !NAME.is_match(name), name)
    })
}

fn name_starts_with_arduino(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "name", |name| fail_if(STARTS_WITH_ARDUINO.is_match(name), name))
}

fn name_missing_official_prefix(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "name", |name| fail_if(!name.starts_with("Arduino_"), name))
}

fn name_contains_arduino(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "name", |name| fail_if(CONTAINS_ARDUINO.is_match(name), name))
}

fn name_has_spaces(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "name", |name| fail_if(name.contains(' '), name))
}

fn name_contains_library(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "name", |name| {
        fail_if(name.to_lowercase().contains("library"), name)
    })
}

fn name_duplicate(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "name", |name| match ctx.library_index() {
        Ok(index) => fail_if(index.contains(name), name),
        Err(error) => RuleOutput::not_run(error),
    })
}

fn name_not_in_index(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "name", |name| match ctx.library_index() {
        Ok(index) => fail_if(!index.contains(name), name),
        Err(error) => RuleOutput::not_run(error),
    })
}

fn version_missing(ctx: &RuleContext<'_>) -> RuleOutput {
    field_missing(ctx, "version")
}

fn version_not_relaxed_semver(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "version", |version| {
        fail_if(parse_relaxed(version).is_none(), version)
    })
}

fn version_not_strict_semver(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "version", |version| fail_if(!is_strict(version), version))
}

fn version_behind_tag(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "version", |version_text| {
        let Some(version) = parse_relaxed(version_text) else {
            return RuleOutput::not_run("Can't parse version value");
        };
        trace!("version value: {}", version);

        let tags = match ctx.data.git() {
            GitData::NotRepository => {
                return RuleOutput::skip("Project path is not a repository")
            }
            GitData::Error(error) => return RuleOutput::fail(error.clone()),
            GitData::Repository(state) => &state.tags,
        };

        for tag in tags {
            // Release tags are commonly prefixed with "v".
            let name = tag.name.strip_prefix('v').unwrap_or(&tag.name);
            let Some(tag_version) = parse_relaxed(name) else {
                trace!("Disregarding unparsable tag {}", tag.name);
                continue;
            };
            trace!("Tag {} version: {}", tag.name, tag_version);

            if tag_version <= version {
                return RuleOutput::pass();
            }
            if !tag_version.pre.is_empty() {
                // The lack of a version bump may be intentional for a prerelease.
                trace!("Disregarding prerelease tag {}", tag.name);
                continue;
            }
            return RuleOutput::fail(format!("{name} vs {version_text}"));
        }

        RuleOutput::pass()
    })
}

fn author_missing(ctx: &RuleContext<'_>) -> RuleOutput {
    field_missing(ctx, "author")
}

fn author_too_short(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "author", |author| shorter_than(author, 1))
}

fn maintainer_missing(ctx: &RuleContext<'_>) -> RuleOutput {
    field_missing(ctx, "maintainer")
}

fn maintainer_too_short(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "maintainer", |maintainer| shorter_than(maintainer, 1))
}

fn maintainer_starts_with_arduino(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "maintainer", |maintainer| {
        fail_if(STARTS_WITH_ARDUINO.is_match(maintainer), maintainer)
    })
}

fn email_as_maintainer_alias(ctx: &RuleContext<'_>) -> RuleOutput {
    with_properties(ctx, |properties| {
        if !properties.contains_key("email") {
            return RuleOutput::skip("Field not present");
        }
        fail_if(!properties.contains_key("maintainer"), "")
    })
}

/// Runs `check` on `email` when it stands in for `maintainer`.
fn with_email_alias(ctx: &RuleContext<'_>, check: impl FnOnce(&str) -> RuleOutput) -> RuleOutput {
    with_properties(ctx, |properties| {
        if properties.contains_key("maintainer") {
            return RuleOutput::skip("No email alias field");
        }
        properties
            .get("email")
            .map_or_else(|| RuleOutput::skip("Field not present"), check)
    })
}

fn email_too_short(ctx: &RuleContext<'_>) -> RuleOutput {
    with_email_alias(ctx, |email| shorter_than(email, 1))
}

fn email_starts_with_arduino(ctx: &RuleContext<'_>) -> RuleOutput {
    with_email_alias(ctx, |email| fail_if(STARTS_WITH_ARDUINO.is_match(email), email))
}

fn sentence_missing(ctx: &RuleContext<'_>) -> RuleOutput {
    field_missing(ctx, "sentence")
}

fn sentence_too_short(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "sentence", |sentence| shorter_than(sentence, 1))
}

fn sentence_spell_check(ctx: &RuleContext<'_>) -> RuleOutput {
    spell_check_field(ctx, "sentence")
}

fn paragraph_missing(ctx: &RuleContext<'_>) -> RuleOutput {
    field_missing(ctx, "paragraph")
}

fn paragraph_spell_check(ctx: &RuleContext<'_>) -> RuleOutput {
    spell_check_field(ctx, "paragraph")
}

fn paragraph_repeats_sentence(ctx: &RuleContext<'_>) -> RuleOutput {
    with_properties(ctx, |properties| {
        match (properties.get("sentence"), properties.get("paragraph")) {
            (Some(sentence), Some(paragraph)) => fail_if(paragraph.starts_with(sentence), ""),
            _ => RuleOutput::not_run("Field not present"),
        }
    })
}

fn category_missing(ctx: &RuleContext<'_>) -> RuleOutput {
    field_missing(ctx, "category")
}

fn category_invalid(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "category", |category| {
        fail_if(!VALID_CATEGORIES.contains(&category), category)
    })
}

fn category_uncategorized(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "category", |category| {
        fail_if(category == "Uncategorized", "")
    })
}

fn url_missing(ctx: &RuleContext<'_>) -> RuleOutput {
    field_missing(ctx, "url")
}

fn url_too_short(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "url", |url| shorter_than(url, 1))
}

fn url_invalid(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "url", |url| fail_if(url::Url::parse(url).is_err(), url))
}

fn url_dead_link(ctx: &RuleContext<'_>) -> RuleOutput {
    with_field(ctx, "url", |url| {
        trace!("Checking URL: {}", url);
        match ctx.capabilities.http.get(url) {
            Ok(status) if status.is_ok() => RuleOutput::pass(),
            Ok(status) => RuleOutput::fail(status.to_string()),
            Err(error) => RuleOutput::fail(error.to_string()),
        }
    })
}

fn architectures_missing(ctx: &RuleContext<'_>) -> RuleOutput {
    field_missing(ctx, "architectures")
}

fn architectures_too_short(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "architectures", |architectures| {
        shorter_than(architectures, 1)
    })
}

fn architectures_solo_alias(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "architectures", |architectures| {
        let lowered = architectures.to_lowercase();
        let listed = comma_separated(&lowered);

        let solo_aliases: Vec<&str> = listed
            .iter()
            .copied()
            .filter(|architecture| {
                ARCHITECTURE_ALIASES
                    .iter()
                    .find(|(alias, _)| alias == architecture)
                    .is_some_and(|(_, names)| {
                        !names
                            .iter()
                            .any(|name| listed.iter().any(|l| l.eq_ignore_ascii_case(name)))
                    })
            })
            .collect();
        fail_with_list(&solo_aliases)
    })
}

fn architectures_value_case(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "architectures", |architectures| {
        let listed = comma_separated(architectures);

        let miscased: Vec<&str> = listed
            .iter()
            .copied()
            .filter(|architecture| {
                !COMMON_ARCHITECTURES.contains(architecture)
                    && COMMON_ARCHITECTURES.iter().any(|common| {
                        common.eq_ignore_ascii_case(architecture) && !listed.contains(common)
                    })
            })
            .collect();
        fail_with_list(&miscased)
    })
}

/// One item of the `depends` field.
struct Dependency<'a> {
    name: &'a str,
    constraint: Option<&'a str>,
}

fn dependencies(depends: &str) -> Vec<Dependency<'_>> {
    comma_separated(depends)
        .into_iter()
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once('(') {
            Some((name, rest)) => Dependency {
                name: name.trim(),
                constraint: Some(rest.trim_end().strip_suffix(')').unwrap_or(rest)),
            },
            None => Dependency {
                name: item,
                constraint: None,
            },
        })
        .collect()
}

fn depends_disallowed_characters(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "depends", |depends| {
        fail_if(!DEPENDS.is_match(depends), depends)
    })
}

fn depends_not_in_index(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "depends", |depends| {
        let index = match ctx.library_index() {
            Ok(index) => index,
            Err(error) => return RuleOutput::not_run(error),
        };

        let missing: Vec<&str> = dependencies(depends)
            .into_iter()
            .map(|dependency| dependency.name)
            .filter(|name| {
                trace!("Checking if dependency {} is in index.", name);
                !index.contains(name)
            })
            .collect();
        fail_with_list(&missing)
    })
}

fn depends_constraint_invalid(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "depends", |depends| {
        let invalid: Vec<String> = dependencies(depends)
            .into_iter()
            .filter_map(|dependency| {
                let constraint = dependency.constraint?;
                (!valid_constraint(constraint))
                    .then(|| format!("{} ({constraint})", dependency.name))
            })
            .collect();
        fail_with_list(&invalid)
    })
}

/// Checks version constraint syntax. An empty constraint matches any version.
fn valid_constraint(constraint: &str) -> bool {
    let mut parser = ConstraintParser {
        rest: constraint.trim(),
    };
    if parser.rest.is_empty() {
        return true;
    }
    parser.expression() && parser.rest.is_empty()
}

/// Recursive descent over `expr := term ('||' term)*`,
/// `term := factor ('&&' factor)*`,
/// `factor := '!' factor | '(' expr ')' | op version`.
struct ConstraintParser<'a> {
    rest: &'a str,
}

impl ConstraintParser<'_> {
    fn eat(&mut self, token: &str) -> bool {
        let trimmed = self.rest.trim_start();
        match trimmed.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest.trim_start();
                true
            }
            None => false,
        }
    }

    fn expression(&mut self) -> bool {
        if !self.term() {
            return false;
        }
        while self.eat("||") {
            if !self.term() {
                return false;
            }
        }
        true
    }

    fn term(&mut self) -> bool {
        if !self.factor() {
            return false;
        }
        while self.eat("&&") {
            if !self.factor() {
                return false;
            }
        }
        true
    }

    fn factor(&mut self) -> bool {
        if self.eat("!") {
            return self.factor();
        }
        if self.eat("(") {
            return self.expression() && self.eat(")");
        }
        let has_operator = [">=", "<=", "=", ">", "<", "^", "~"]
            .iter()
            .any(|op| self.eat(op));
        has_operator && self.version()
    }

    fn version(&mut self) -> bool {
        let end = self
            .rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+')))
            .unwrap_or(self.rest.len());
        let (text, rest) = self.rest.split_at(end);
        self.rest = rest.trim_start();
        parse_relaxed(text).is_some()
    }
}

fn dot_a_linkage_invalid(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "dot_a_linkage", |value| {
        fail_if(!matches!(value, "true" | "false"), value)
    })
}

fn dot_a_linkage_with_flat_layout(ctx: &RuleContext<'_>) -> RuleOutput {
    let Some(library) = ctx.data.library().filter(|l| l.is_loaded()) else {
        return RuleOutput::not_run("Library not loaded");
    };
    if !library.properties().contains_key("dot_a_linkage") {
        return RuleOutput::skip("Field not present");
    }
    fail_if(library.dot_a_linkage() && library.layout() == Layout::Flat, "")
}

fn includes_too_short(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "includes", |includes| shorter_than(includes, 1))
}

fn includes_item_not_found(ctx: &RuleContext<'_>) -> RuleOutput {
    let headers = ctx
        .data
        .library()
        .map(|l| l.source_headers())
        .unwrap_or_default();
    with_optional_field(ctx, "includes", |includes| {
        let missing: Vec<&str> = comma_separated(includes)
            .into_iter()
            .filter(|include| !include.is_empty() && !headers.iter().any(|h| h == include))
            .collect();
        fail_with_list(&missing)
    })
}

fn precompiled_invalid(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "precompiled", |value| {
        fail_if(!matches!(value, "true" | "full" | "false"), value)
    })
}

fn precompiled_with_flat_layout(ctx: &RuleContext<'_>) -> RuleOutput {
    let Some(library) = ctx.data.library().filter(|l| l.is_loaded()) else {
        return RuleOutput::not_run("Library not loaded");
    };
    match library.properties().get("precompiled") {
        None => RuleOutput::skip("Field not present"),
        Some(value) => fail_if(
            library.is_precompiled() && library.layout() == Layout::Flat,
            value,
        ),
    }
}

fn ldflags_too_short(ctx: &RuleContext<'_>) -> RuleOutput {
    with_optional_field(ctx, "ldflags", |ldflags| {
        shorter_than(ldflags, LDFLAGS_MIN_LENGTH)
    })
}

fn misspelled_optional_field(ctx: &RuleContext<'_>) -> RuleOutput {
    with_properties(ctx, |properties| {
        let misspelled: Vec<&str> = properties
            .keys()
            .filter(|key| {
                OPTIONAL_FIELD_MISSPELLINGS
                    .iter()
                    .any(|(pattern, correct)| key != correct && pattern.is_match(key))
            })
            .collect();
        fail_with_list(&misspelled)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_pattern() {
        assert!(NAME.is_match("Servo"));
        assert!(NAME.is_match("My Library_2.0-beta"));
        assert!(NAME.is_match("3D Printer"));
        assert!(!NAME.is_match("123"));
        assert!(!NAME.is_match("_Servo"));
        assert!(!NAME.is_match("Servo!"));
    }

    #[test]
    fn depends_pattern() {
        for valid in [
            "",
            "Servo",
            "Servo, Adafruit GFX Library",
            "Servo (>=1.0.0)",
            "Servo (), WiFi101 (>1.0 && <2.0 || =3.0.0)",
            "Foo ((>1.0.0 && <2.0.0) || >3.0.0)",
        ] {
            assert!(DEPENDS.is_match(valid), "{valid}");
        }
        for invalid in ["Servo,", "-Servo", "Servo(>1.2.3)", ",Servo"] {
            assert!(!DEPENDS.is_match(invalid), "{invalid}");
        }
    }

    #[test]
    fn dependency_items() {
        let items = dependencies("Servo, , WiFi (>=1.0), Foo ()");
        let names: Vec<_> = items.iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Servo", "WiFi", "Foo"]);
        assert_eq!(items[0].constraint, None);
        assert_eq!(items[1].constraint, Some(">=1.0"));
        assert_eq!(items[2].constraint, Some(""));
    }

    #[test]
    fn version_constraints() {
        for valid in [
            "",
            "=1.0.0",
            ">1.0",
            ">= 1.2.3",
            "^1.0.0",
            "~1.2",
            ">1.0.0 && <2.0.0",
            "<1.0.0 || >=2.0.0",
            "!(=1.5.0)",
            "(>=1.0.0 && <2.0.0) || =3.0.0-rc.1",
        ] {
            assert!(valid_constraint(valid), "{valid}");
        }
        for invalid in ["1.0.0", ">", ">foo", ">1.0.0 &&", "(>1.0.0", ">1.0.0 | <2.0.0"] {
            assert!(!valid_constraint(invalid), "{invalid}");
        }
    }

    #[test]
    fn optional_field_misspellings() {
        let misspelled = |key: &str| {
            OPTIONAL_FIELD_MISSPELLINGS
                .iter()
                .any(|(pattern, correct)| key != *correct && pattern.is_match(key))
        };
        for key in [
            "depend",
            "Depends",
            "dot-a-linkage",
            "dot_a_linkages",
            "Dot_a_linkage",
            "include",
            "Includes",
            "precompile",
            "pre-compiled",
            "Precompiled",
            "ld_flags",
            "ldflag",
        ] {
            assert!(misspelled(key), "{key}");
        }
        for key in ["depends", "dot_a_linkage", "includes", "precompiled", "ldflags", "name"] {
            assert!(!misspelled(key), "{key}");
        }
    }

    #[test]
    fn catalogue_of_field_rules_is_ordered() {
        let ids: Vec<_> = RULES.iter().map(|d| d.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert_eq!(ids.first(), Some(&"LP006"));
        assert_eq!(ids.last(), Some(&"LP057"));
    }
}
