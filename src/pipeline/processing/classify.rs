use crate::types::{Category, SpecialtyPoints};

/// Canonical form of a specialty tag: lower-case, hyphen separated
pub fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect()
}

/// Maps specialty points to a category and a display label
pub struct CategoryClassifier;

impl CategoryClassifier {
    /// Category of the highest-scoring tag; `ROULEUR` when there are no points.
    pub fn from_points(points: &SpecialtyPoints) -> Category {
        match points.top() {
            Some((tag, _)) => Self::category_for_tag(tag),
            None => Category::Rouleur,
        }
    }

    pub fn category_for_tag(tag: &str) -> Category {
        match normalize_tag(tag).as_str() {
            "sprint" => Category::Sprinter,
            "climber" => Category::Climber,
            "gc" => Category::Gc,
            "one-day-races" | "hills" => Category::Classics,
            _ => Category::Rouleur,
        }
    }

    /// Human label for the highest-scoring tag; empty when there are no points.
    pub fn speciality_label(points: &SpecialtyPoints) -> String {
        let Some((tag, _)) = points.top() else {
            return String::new();
        };
        let label = match normalize_tag(tag).as_str() {
            "sprint" => "Sprinter",
            "climber" => "Climber",
            "gc" => "GC",
            "one-day-races" => "Classics",
            "hills" => "Puncheur",
            "time-trial" => "Time Trial",
            _ => "All-rounder",
        };
        label.to_string()
    }
}

/// Curated surname fragments per category for sources without specialty points
#[derive(Debug, Clone)]
pub struct NameLists {
    pub sprinters: Vec<String>,
    pub gc_riders: Vec<String>,
    pub climbers: Vec<String>,
    pub classics: Vec<String>,
}

impl Default for NameLists {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            sprinters: owned(&[
                "philipsen", "milan", "groenewegen", "merlier", "ackermann",
                "cavendish", "jakobsen", "kooij", "de lie", "groves", "matthews",
            ]),
            gc_riders: owned(&[
                "pogačar", "pogacar", "vingegaard", "evenepoel", "roglic", "roglič",
                "almeida", "ayuso", "rodriguez", "yates", "mas", "carapaz", "bernal",
                "hindley", "vlasov", "tiberi", "jorgenson", "uijtdebroeks", "thomas",
            ]),
            climbers: owned(&[
                "healy", "vine", "gaudu", "martinez", "bilbao", "landa", "ciccone",
                "buitrago", "quintana", "kuss", "powless", "bardet", "gall",
            ]),
            classics: owned(&[
                "van der poel", "van aert", "pidcock", "pedersen", "asgreen",
                "mohoric", "mohorič", "alaphilippe", "laporte", "van baarle", "benoot",
            ]),
        }
    }
}

/// Name-based fallback classifier.
///
/// Lists are checked sprinters, GC, climbers, classics; the first list with a
/// fragment contained in the lower-cased name wins. Fragments are plain
/// substrings, so short ones ("mas", "milan") can hit unrelated names.
#[derive(Debug, Clone, Default)]
pub struct HeuristicClassifier {
    lists: NameLists,
}

impl HeuristicClassifier {
    pub fn new(lists: NameLists) -> Self {
        Self { lists }
    }

    /// First curated list containing a fragment of the name, else `ROULEUR`
    pub fn classify(&self, name: &str) -> Category {
        let lowered = name.to_lowercase();
        let hit = |list: &[String]| list.iter().any(|fragment| lowered.contains(fragment.as_str()));

        if hit(&self.lists.sprinters) {
            Category::Sprinter
        } else if hit(&self.lists.gc_riders) {
            Category::Gc
        } else if hit(&self.lists.climbers) {
            Category::Climber
        } else if hit(&self.lists.classics) {
            Category::Classics
        } else {
            Category::Rouleur
        }
    }
}
