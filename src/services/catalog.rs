use std::sync::OnceLock;

use serde::Deserialize;

use crate::services::assessment::Category;

/// Ordered sub-topic outline for one known concept. Aliases cover the
/// different spellings clients have historically sent for the same topic.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicOutline {
    pub aliases: Vec<String>,
    pub subtopics: Vec<String>,
}

/// The onboarding catalogs plus the per-topic outline table. Versioned data:
/// the builtin tables can be replaced wholesale by pointing `CATALOG_PATH`
/// at a JSON file with the same shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub structured: Vec<String>,
    pub advanced: Vec<String>,
    pub outlines: Vec<TopicOutline>,
}

impl Catalog {
    pub fn concepts_for(&self, category: Category) -> &[String] {
        match category {
            Category::Structured => &self.structured,
            Category::Advanced => &self.advanced,
        }
    }

    pub fn outline(&self, concept_name: &str) -> Option<&TopicOutline> {
        let needle = concept_name.trim().to_lowercase();
        self.outlines.iter().find(|outline| {
            outline
                .aliases
                .iter()
                .any(|alias| alias.to_lowercase() == needle)
        })
    }
}

static CATALOG: OnceLock<Catalog> = OnceLock::new();

pub fn catalog() -> &'static Catalog {
    CATALOG.get_or_init(|| match load_from_env() {
        Some(loaded) => loaded,
        None => builtin(),
    })
}

fn load_from_env() -> Option<Catalog> {
    let path = crate::config::env_string("CATALOG_PATH")?;
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(%path, error = %err, "catalog file unreadable, using builtin");
            return None;
        }
    };
    match serde_json::from_str::<Catalog>(&raw) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(%path, error = %err, "catalog file invalid, using builtin");
            None
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin() -> Catalog {
    let outlines = BUILTIN_OUTLINES
        .iter()
        .map(|(aliases, subtopics)| TopicOutline {
            aliases: owned(aliases),
            subtopics: owned(subtopics),
        })
        .collect();

    Catalog {
        structured: owned(STRUCTURED_CONCEPTS),
        advanced: owned(ADVANCED_CONCEPTS),
        outlines,
    }
}

const STRUCTURED_CONCEPTS: &[&str] = &[
    "Variables and Data Types",
    "Basic Operators",
    "Conditional Statements (if-else)",
    "Loops (for, while)",
    "Functions Basics",
    "Arrays Introduction",
    "String Manipulation",
    "Basic Input/Output",
    "Linked Lists",
    "Object-Oriented Programming Basics",
];

const ADVANCED_CONCEPTS: &[&str] = &[
    "Advanced Arrays and Memory Management",
    "Linked Lists Implementation",
    "Algorithm Complexity (Big O)",
    "Recursion and Backtracking",
    "Dynamic Programming",
    "Graph Algorithms",
    "Sorting and Searching Algorithms",
    "Advanced Object-Oriented Programming",
    "Design Patterns",
];

type OutlineRow = (&'static [&'static str], &'static [&'static str]);

const BUILTIN_OUTLINES: &[OutlineRow] = &[
    (
        &["Basic Operators", "Operators"],
        &[
            "Assignment operators: =, +=, -=, *=, /=, %=",
            "Arithmetic operators: +, -, *, /, %, ** (exponentiation)",
            "Comparison operators: ==, !=, ===, !==, <, >, <=, >=",
            "Logical operators: && (AND), || (OR), ! (NOT)",
            "Increment and decrement: ++, --",
            "Bitwise operators where the language supports them",
        ],
    ),
    (
        &[
            "Conditional Statements (if-else)",
            "Conditional Statements",
            "if-else",
        ],
        &[
            "if statement: syntax and evaluation",
            "else and else-if chains",
            "Nested conditionals",
            "switch statements and when to prefer them",
            "Ternary operator",
        ],
    ),
    (
        &["Loops (for, while)", "Loops"],
        &[
            "for loop: syntax and iteration pattern",
            "while loop and condition evaluation",
            "do-while loop and how it differs from while",
            "forEach-style iteration",
            "Nested loops",
            "Loop control with break and continue",
        ],
    ),
    (
        &["Variables and Data Types"],
        &[
            "What variables are and why we use them",
            "Declaration, initialization, and scoping",
            "Primitive types: integers, floats, strings, booleans",
            "Complex types: arrays, objects, null/undefined",
            "Type coercion and type checking",
            "Naming rules and conventions",
        ],
    ),
    (
        &["Functions Basics", "Functions"],
        &[
            "Function declaration vs expression",
            "Parameters and arguments",
            "Return values and void functions",
            "Local vs global scope, closures",
            "Higher-order functions",
        ],
    ),
    (
        &["Arrays Introduction", "Arrays"],
        &[
            "Array creation and initialization",
            "Indexing and the length property",
            "Core methods: push, pop, shift, unshift, splice, slice",
            "Iteration: for, forEach, map, filter, reduce",
            "Multi-dimensional arrays",
            "Searching and sorting",
        ],
    ),
    (
        &["Linked Lists"],
        &[
            "Node structure: data and next pointer",
            "Singly, doubly, and circular lists",
            "Insertion, deletion, and traversal",
            "Advantages and disadvantages versus arrays",
            "When to reach for a linked list",
        ],
    ),
    (
        &[
            "Object-Oriented Programming Basics",
            "Object-Oriented Programming",
            "OOP Concepts",
        ],
        &[
            "Classes and objects",
            "Encapsulation and data hiding",
            "Inheritance and its forms",
            "Polymorphism: overloading vs overriding",
            "Abstraction: abstract classes and interfaces",
            "SOLID principles",
        ],
    ),
    (
        &["String Manipulation", "Strings"],
        &[
            "String creation and immutability",
            "Concatenation",
            "Core methods: length, charAt, substring, indexOf, replace, split",
            "Case conversion and trimming",
        ],
    ),
    (
        &["Advanced Arrays and Memory Management"],
        &[
            "Memory layout and cache performance",
            "Dynamic vs static arrays, resizing and amortized cost",
            "Row-major vs column-major multi-dimensional storage",
            "Sparse arrays",
            "Array-backed stacks, queues, and heaps",
        ],
    ),
    (
        &["Linked Lists Implementation"],
        &[
            "Node structure and pointer management",
            "Singly and doubly linked implementations",
            "Circular lists and their uses",
            "Skip lists and XOR lists",
            "Reversal and cycle detection",
            "Iterator patterns over linked structures",
        ],
    ),
    (
        &[
            "Advanced Object-Oriented Programming",
            "Advanced OOP",
        ],
        &[
            "Virtual dispatch and vtables",
            "Multiple inheritance and the diamond problem",
            "Runtime type information and casting",
            "Exception safety and RAII",
            "Smart pointers and object lifecycle",
            "Object pooling and flyweight patterns",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_catalog_has_ten_concepts() {
        assert_eq!(builtin().structured.len(), 10);
    }

    #[test]
    fn test_advanced_catalog_has_nine_concepts() {
        assert_eq!(builtin().advanced.len(), 9);
    }

    #[test]
    fn test_outline_lookup_is_case_insensitive() {
        let catalog = builtin();
        assert!(catalog.outline("basic operators").is_some());
        assert!(catalog.outline("  Operators ").is_some());
    }

    #[test]
    fn test_unknown_concept_has_no_outline() {
        assert!(builtin().outline("Quantum Computing").is_none());
    }

    #[test]
    fn test_every_structured_concept_resolves_or_is_generic() {
        // Known gap: "Basic Input/Output" deliberately has no outline and
        // falls back to the generic prompt structure.
        let catalog = builtin();
        let with_outline = catalog
            .structured
            .iter()
            .filter(|name| catalog.outline(name).is_some())
            .count();
        assert_eq!(with_outline, 9);
    }

    #[test]
    fn test_concepts_for_category() {
        let catalog = builtin();
        assert_eq!(
            catalog.concepts_for(Category::Structured)[0],
            "Variables and Data Types"
        );
        assert_eq!(
            catalog.concepts_for(Category::Advanced)[0],
            "Advanced Arrays and Memory Management"
        );
    }
}
