//! Spell-check capability.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+").expect("valid regex"));

/// A word found misspelled, with its replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    /// The word as written.
    pub original: String,
    /// The suggested word, in the same case style.
    pub replacement: String,
}

/// Finds commonly misspelled words.
pub trait SpellCheck: Send + Sync {
    /// Returns corrections for `text`, in order of appearance.
    fn suggest(&self, text: &str) -> Vec<Correction>;

    /// Returns `text` with every correction applied, or `None` if nothing changed.
    fn correct(&self, text: &str) -> Option<String> {
        let corrections: Vec<_> = self
            .suggest(text)
            .into_iter()
            .filter(|c| c.original != c.replacement)
            .collect();
        if corrections.is_empty() {
            return None;
        }

        let corrected = WORD.replace_all(text, |caps: &Captures<'_>| {
            let word = &caps[0];
            corrections
                .iter()
                .find(|c| c.original == word)
                .map_or_else(|| word.to_string(), |c| c.replacement.clone())
        });
        Some(corrected.into_owned())
    }
}

/// Default dictionary: misspelling → correction, lower case.
///
/// A short list of words common in Arduino library metadata. Pass a fuller
/// [`SpellCheck`] through `Capabilities::with_spell` to replace it.
const MISSPELLINGS: &[(&str, &str)] = &[
    ("accelerometre", "accelerometer"),
    ("accesory", "accessory"),
    ("accomodate", "accommodate"),
    ("acheive", "achieve"),
    ("adress", "address"),
    ("adresses", "addresses"),
    ("algoritm", "algorithm"),
    ("arguement", "argument"),
    ("asynchronus", "asynchronous"),
    ("availible", "available"),
    ("begining", "beginning"),
    ("buton", "button"),
    ("calender", "calendar"),
    ("commnication", "communication"),
    ("communcation", "communication"),
    ("compatable", "compatible"),
    ("compatiable", "compatible"),
    ("controler", "controller"),
    ("controll", "control"),
    ("convertor", "converter"),
    ("definately", "definitely"),
    ("dependancy", "dependency"),
    ("dependant", "dependent"),
    ("devide", "divide"),
    ("diplay", "display"),
    ("dispaly", "display"),
    ("enviroment", "environment"),
    ("exmaple", "example"),
    ("existance", "existence"),
    ("familar", "familiar"),
    ("fucntion", "function"),
    ("funtion", "function"),
    ("funtionality", "functionality"),
    ("guage", "gauge"),
    ("hardward", "hardware"),
    ("humidty", "humidity"),
    ("implemantation", "implementation"),
    ("independant", "independent"),
    ("infomation", "information"),
    ("initalize", "initialize"),
    ("interupt", "interrupt"),
    ("interupts", "interrupts"),
    ("libary", "library"),
    ("libraray", "library"),
    ("librairy", "library"),
    ("measurment", "measurement"),
    ("mesage", "message"),
    ("microcontoller", "microcontroller"),
    ("modul", "module"),
    ("occured", "occurred"),
    ("paramter", "parameter"),
    ("paramters", "parameters"),
    ("peripherial", "peripheral"),
    ("posible", "possible"),
    ("preceed", "precede"),
    ("presure", "pressure"),
    ("proccess", "process"),
    ("programable", "programmable"),
    ("protocal", "protocol"),
    ("recieve", "receive"),
    ("recieved", "received"),
    ("recieves", "receives"),
    ("reciever", "receiver"),
    ("resistence", "resistance"),
    ("seperate", "separate"),
    ("seperately", "separately"),
    ("sensitivty", "sensitivity"),
    ("sensro", "sensor"),
    ("serail", "serial"),
    ("similiar", "similar"),
    ("simpel", "simple"),
    ("sucessful", "successful"),
    ("sucessfully", "successfully"),
    ("suport", "support"),
    ("suported", "supported"),
    ("supprot", "support"),
    ("temperture", "temperature"),
    ("tempreature", "temperature"),
    ("teh", "the"),
    ("threshhold", "threshold"),
    ("transmited", "transmitted"),
    ("transmition", "transmission"),
    ("usefull", "useful"),
    ("voltge", "voltage"),
    ("wich", "which"),
    ("wirless", "wireless"),
    ("writting", "writing"),
];

static DICTIONARY: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| MISSPELLINGS.iter().copied().collect());

/// [`SpellCheck`] backed by the embedded default dictionary of common misspellings.
#[derive(Debug, Default, Clone, Copy)]
pub struct DictionarySpellCheck;

fn match_case(original: &str, replacement: &str) -> String {
    if original.len() > 1 && original.chars().all(|c| c.is_ascii_uppercase()) {
        return replacement.to_ascii_uppercase();
    }
    let mut chars = original.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            let mut out = replacement[..1].to_ascii_uppercase();
            out.push_str(&replacement[1..]);
            out
        }
        _ => replacement.to_string(),
    }
}

impl SpellCheck for DictionarySpellCheck {
    fn suggest(&self, text: &str) -> Vec<Correction> {
        WORD.find_iter(text)
            .filter_map(|word| {
                let word = word.as_str();
                DICTIONARY
                    .get(word.to_ascii_lowercase().as_str())
                    .map(|replacement| Correction {
                        original: word.to_string(),
                        replacement: match_case(word, replacement),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_misspellings_in_order() {
        let found = DictionarySpellCheck.suggest("A libary to recieve data");
        assert_eq!(
            found,
            vec![
                Correction {
                    original: "libary".into(),
                    replacement: "library".into()
                },
                Correction {
                    original: "recieve".into(),
                    replacement: "receive".into()
                },
            ]
        );
    }

    #[test]
    fn preserves_case_style() {
        let found = DictionarySpellCheck.suggest("Libary TEH");
        assert_eq!(found[0].replacement, "Library");
        assert_eq!(found[1].replacement, "THE");
    }

    #[test]
    fn corrects_whole_words_only() {
        assert_eq!(
            DictionarySpellCheck.correct("Recieve and teh theta"),
            Some("Receive and the theta".to_string())
        );
        assert_eq!(DictionarySpellCheck.correct("All good here."), None);
    }
}
