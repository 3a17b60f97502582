use std::collections::{BTreeSet, HashMap, HashSet};
use std::str::FromStr;

use anyhow::bail;
use log::{debug, warn};
use serde::Serialize;

use crate::find::{BreadthFirst, Graph};

pub type Person = String;

/// A friendship between two people, written as `name1,name2`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    pub a: Person,
    pub b: Person,
}

impl FromStr for Connection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s.split(',').map(str::trim).collect();

        match names[..] {
            [a, b] if !a.is_empty() && !b.is_empty() => Ok(Connection {
                a: a.to_string(),
                b: b.to_string(),
            }),
            [_, _] => bail!("Empty name in connection: {:?}", s),
            _ => bail!(
                "Expected two comma separated names, got {} in {:?}",
                names.len(),
                s
            ),
        }
    }
}

/// An input line that did not describe a connection
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RejectedLine {
    /// 1-based line number
    pub line: usize,
    pub text: String,
    pub reason: String,
}

/// Every friendship stored in both directions, in input order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipGraph {
    connections: Vec<(Person, Person)>,
}

impl RelationshipGraph {
    pub fn from_connections(connections: impl IntoIterator<Item = Connection>) -> Self {
        let connections = connections
            .into_iter()
            .flat_map(|Connection { a, b }| [(a.clone(), b.clone()), (b, a)])
            .collect();

        Self { connections }
    }

    /// Parse one connection per line. Malformed lines, blank ones included, are dropped and
    /// handed back so the caller can report them.
    pub fn from_lines<S: AsRef<str>>(
        lines: impl IntoIterator<Item = S>,
    ) -> (Self, Vec<RejectedLine>) {
        let mut rejected = Vec::new();
        let mut connections = Vec::new();

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            match line.parse::<Connection>() {
                Ok(connection) => connections.push(connection),
                Err(e) => {
                    warn!("dropping line {}: {}", index + 1, e);
                    rejected.push(RejectedLine {
                        line: index + 1,
                        text: line.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        (Self::from_connections(connections), rejected)
    }

    /// Both directions of every friendship
    pub fn connections(&self) -> &[(Person, Person)] {
        &self.connections
    }

    pub fn adjacency(&self) -> Adjacency {
        let mut neighbors: HashMap<Person, Vec<Person>> = HashMap::new();
        for (from, to) in &self.connections {
            neighbors.entry(from.clone()).or_default().push(to.clone());
        }

        debug!(
            "built adjacency for {} people from {} connections",
            neighbors.len(),
            self.connections.len() / 2
        );

        Adjacency { neighbors }
    }

    /// Every distinct person with at least one connection
    pub fn people(&self) -> BTreeSet<&str> {
        self.connections.iter().map(|(a, _)| a.as_str()).collect()
    }

    /// Every distinct friendship once, with the names in sorted order
    pub fn pairs(&self) -> BTreeSet<(&str, &str)> {
        self.connections
            .iter()
            .filter(|(a, b)| a <= b)
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect()
    }

    /// Render as an undirected Graphviz graph
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("graph friends {\n");
        for person in self.people() {
            dot.push_str(&format!("    {};\n", dot_quote(person)));
        }
        for (a, b) in self.pairs() {
            dot.push_str(&format!("    {} -- {};\n", dot_quote(a), dot_quote(b)));
        }
        dot.push_str("}\n");
        dot
    }
}

/// Graphviz quoted ID, only `"` and `\` need escaping
fn dot_quote(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Person to the people they are directly connected to. A repeated friendship shows up as a
/// repeated neighbor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Adjacency {
    neighbors: HashMap<Person, Vec<Person>>,
}

impl Adjacency {
    /// Direct connections of a person, empty for someone without any
    pub fn neighbors(&self, person: &str) -> &[Person] {
        self.neighbors.get(person).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Everyone reachable from `start` through any chain of friendships, `start` included
    pub fn find_friend_group(&self, start: &str) -> HashSet<Person> {
        BreadthFirst::new(self, start.to_string()).finish(self)
    }
}

impl Graph for Adjacency {
    type Reference = Person;
    type Edge = ();

    fn neighbors_of(&self, node: &Person) -> impl Iterator<Item = (Person, ())> {
        self.neighbors(node).iter().map(|p| (p.clone(), ()))
    }
}
