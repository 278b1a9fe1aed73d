use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Raw label -> semantic label. Labels not listed pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenameMapping(BTreeMap<String, String>);

impl RenameMapping {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(raw, semantic)| (raw.to_string(), semantic.to_string()))
                .collect(),
        )
    }

    pub fn insert(&mut self, raw: impl Into<String>, semantic: impl Into<String>) {
        self.0.insert(raw.into(), semantic.into());
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.0.get(raw).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // Join keys that no entry of this mapping produces.
    pub fn missing_keys<'a>(&self, keys: &[&'a str]) -> Vec<&'a str> {
        keys.iter()
            .copied()
            .filter(|key| !self.0.values().any(|semantic| semantic == key))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MappingVersion {
    // Keys plus the first two questions of each module
    Short,
    #[default]
    Full,
}

const KEY_COLUMNS: [(&str, &str); 4] = [
    ("conglome", "id_conglomerado"),
    ("vivienda", "id_vivienda"),
    ("hogar", "id_hogar"),
    ("ubigeo", "ubigeo"),
];

const MODULE_100_QUESTIONS: [(&str, &str); 11] = [
    ("p100", "asistencia_escolar"),
    ("p101", "nivel_educativo_actual"),
    ("p102", "grado_aprobado"),
    ("p103", "motivo_no_asiste"),
    ("p104", "tipo_centro_estudio"),
    ("p105", "lugar_estudio"),
    ("p106", "nivel_maximo"),
    ("p107", "termino_estudios"),
    ("p108", "anos_aprobados"),
    ("p109", "analfabeto"),
    ("p110", "sabe_leer"),
];

const MODULE_200_QUESTIONS: [(&str, &str); 11] = [
    ("p200", "salud_afiliacion"),
    ("p201", "tipo_seguro"),
    ("p202", "lugar_atencion"),
    ("p203", "ultimo_control"),
    ("p204", "estado_salud_autop"),
    ("p205", "problemas_salud"),
    ("p206", "dias_enfermo"),
    ("p207", "hospitalizacion"),
    ("p208", "tipo_enfermedad"),
    ("p209", "motivo_no_atencion"),
    ("p210", "gasto_salud"),
];

// The pair of rename mappings used for one merge of module 100 with module 200.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleMappings {
    pub module_100: RenameMapping,
    pub module_200: RenameMapping,
}

impl ModuleMappings {
    pub fn for_version(version: MappingVersion) -> Self {
        let questions = match version {
            MappingVersion::Short => 2,
            MappingVersion::Full => MODULE_100_QUESTIONS.len(),
        };

        Self {
            module_100: build_mapping(&MODULE_100_QUESTIONS[..questions]),
            module_200: build_mapping(&MODULE_200_QUESTIONS[..questions]),
        }
    }
}

fn build_mapping(questions: &[(&str, &str)]) -> RenameMapping {
    let mut mapping = RenameMapping::from_pairs(&KEY_COLUMNS);
    for (raw, semantic) in questions {
        mapping.insert(*raw, *semantic);
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::JOIN_KEYS;

    #[test]
    fn test_version_sizes() {
        let short = ModuleMappings::for_version(MappingVersion::Short);
        assert_eq!(short.module_100.len(), 6);
        assert_eq!(short.module_200.len(), 6);

        let full = ModuleMappings::for_version(MappingVersion::Full);
        assert_eq!(full.module_100.len(), 15);
        assert_eq!(full.module_200.len(), 15);
        assert_eq!(ModuleMappings::for_version(MappingVersion::default()), full);
    }

    #[test]
    fn test_every_version_produces_join_keys() {
        for version in [MappingVersion::Short, MappingVersion::Full] {
            let mappings = ModuleMappings::for_version(version);
            assert!(mappings.module_100.missing_keys(&JOIN_KEYS).is_empty());
            assert!(mappings.module_200.missing_keys(&JOIN_KEYS).is_empty());
        }
    }

    #[test]
    fn test_full_mapping_entries() {
        let full = ModuleMappings::for_version(MappingVersion::Full);
        assert_eq!(full.module_100.get("p110"), Some("sabe_leer"));
        assert_eq!(full.module_200.get("p210"), Some("gasto_salud"));
        assert_eq!(full.module_100.get("conglome"), Some("id_conglomerado"));
        assert_eq!(full.module_200.get("p100"), None);
    }

    #[test]
    fn test_missing_keys() {
        let mapping = RenameMapping::from_pairs(&[("conglome", "id_conglomerado"), ("hogar", "id_hogar")]);
        assert_eq!(mapping.missing_keys(&JOIN_KEYS), vec!["id_vivienda", "ubigeo"]);
    }
}
