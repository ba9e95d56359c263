// SPDX-License-Identifier: PMPL-1.0-or-later

//! Symbolic term model and Robinson unification
//!
//! Terms are constants, named variables, or n-ary predicates. Unification
//! extends a substitution (variable name to term) and fails with `None`;
//! failure is normal control flow for the chainer, never an error.

use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A logic term
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Constant symbol
    Sym(String),
    /// Named logic variable, scoped to its rule
    Var(String),
    /// Compound term: name(args...)
    Pred(String, Vec<Term>),
}

impl Term {
    pub fn sym(name: impl Into<String>) -> Self {
        Term::Sym(name.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    pub fn pred(name: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Pred(name.into(), args)
    }

    /// True when no variable occurs anywhere in the term tree
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Sym(_) => true,
            Term::Var(_) => false,
            Term::Pred(_, args) => args.iter().all(Term::is_ground),
        }
    }

    fn collect_vars(&self, out: &mut HashSet<String>) {
        match self {
            Term::Sym(_) => {}
            Term::Var(name) => {
                out.insert(name.clone());
            }
            Term::Pred(_, args) => {
                for arg in args {
                    arg.collect_vars(out);
                }
            }
        }
    }

    fn rename_vars(&self, rename: &impl Fn(&str) -> String) -> Term {
        match self {
            Term::Sym(_) => self.clone(),
            Term::Var(name) => Term::Var(rename(name)),
            Term::Pred(name, args) => Term::Pred(
                name.clone(),
                args.iter().map(|arg| arg.rename_vars(rename)).collect(),
            ),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Sym(name) => write!(f, "{}", name),
            Term::Var(name) => write!(f, "?{}", name),
            Term::Pred(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Substitution: mapping from variable names to terms.
///
/// Application resolves binding chains to a fixed point, so applying a
/// substitution twice equals applying it once.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    bindings: HashMap<String, Term>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolve a term one level: chase variable bindings at the root
    fn walk(&self, term: &Term) -> Term {
        match term {
            Term::Var(name) => {
                if let Some(bound) = self.bindings.get(name) {
                    self.walk(bound)
                } else {
                    term.clone()
                }
            }
            _ => term.clone(),
        }
    }

    /// Apply the substitution throughout a term tree
    pub fn resolve(&self, term: &Term) -> Term {
        match self.walk(term) {
            Term::Pred(name, args) => {
                Term::Pred(name, args.iter().map(|arg| self.resolve(arg)).collect())
            }
            other => other,
        }
    }

    /// Fully resolved binding of a variable, or None when unbound
    pub fn lookup(&self, var: &str) -> Option<Term> {
        let resolved = self.resolve(&Term::var(var));
        match resolved {
            Term::Var(ref name) if name == var => None,
            other => Some(other),
        }
    }

    /// Unify two terms, extending the substitution on success.
    ///
    /// Arguments are folded left to right; a variable never captures a term
    /// containing itself (occurs check).
    pub fn unify(&self, t1: &Term, t2: &Term) -> Option<Substitution> {
        let t1 = self.walk(t1);
        let t2 = self.walk(t2);

        match (&t1, &t2) {
            (a, b) if a == b => Some(self.clone()),

            (Term::Var(name), _) => {
                if self.occurs(name, &t2) {
                    return None;
                }
                let mut extended = self.clone();
                extended.bindings.insert(name.clone(), t2);
                Some(extended)
            }
            (_, Term::Var(name)) => {
                if self.occurs(name, &t1) {
                    return None;
                }
                let mut extended = self.clone();
                extended.bindings.insert(name.clone(), t1);
                Some(extended)
            }

            (Term::Pred(n1, args1), Term::Pred(n2, args2)) => {
                if n1 != n2 || args1.len() != args2.len() {
                    return None;
                }
                let mut subst = self.clone();
                for (a1, a2) in args1.iter().zip(args2.iter()) {
                    subst = subst.unify(a1, a2)?;
                }
                Some(subst)
            }

            _ => None,
        }
    }

    /// Does `var` occur anywhere in `term`, chasing bindings
    fn occurs(&self, var: &str, term: &Term) -> bool {
        match self.walk(term) {
            Term::Var(name) => name == var,
            Term::Pred(_, args) => args.iter().any(|arg| self.occurs(var, arg)),
            Term::Sym(_) => false,
        }
    }
}

/// A named applied term: the atom of facts and rules.
///
/// A predicate with no variables is a fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    pub name: String,
    pub args: Vec<Term>,
}

/// Ground predicate stored in the knowledge base
pub type Fact = Predicate;

impl Predicate {
    pub fn new(name: impl Into<String>, args: Vec<Term>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// View as a compound term for unification
    pub fn to_term(&self) -> Term {
        Term::Pred(self.name.clone(), self.args.clone())
    }

    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }

    /// Apply a substitution to every argument
    pub fn substitute(&self, subst: &Substitution) -> Predicate {
        Predicate {
            name: self.name.clone(),
            args: self.args.iter().map(|arg| subst.resolve(arg)).collect(),
        }
    }

    fn vars(&self) -> HashSet<String> {
        let mut out = HashSet::new();
        for arg in &self.args {
            arg.collect_vars(&mut out);
        }
        out
    }

    fn rename_vars(&self, rename: &impl Fn(&str) -> String) -> Predicate {
        Predicate {
            name: self.name.clone(),
            args: self
                .args
                .iter()
                .map(|arg| arg.rename_vars(rename))
                .collect(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_term())
    }
}

/// An inference rule: premises entail the conclusion.
///
/// Construction enforces range restriction (every conclusion variable must
/// be bound by some premise), which in turn guarantees that every derived
/// conclusion is ground.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    premises: Vec<Predicate>,
    conclusion: Predicate,
}

impl Rule {
    pub fn new(name: &str, premises: Vec<Predicate>, conclusion: Predicate) -> Result<Self> {
        let bound: HashSet<String> = premises.iter().flat_map(|p| p.vars()).collect();
        let unbound: Vec<String> = conclusion
            .vars()
            .into_iter()
            .filter(|v| !bound.contains(v))
            .collect();
        if !unbound.is_empty() {
            let mut unbound = unbound;
            unbound.sort();
            return Err(anyhow!(
                "rule {}: conclusion variables not bound by any premise: {}",
                name,
                unbound.join(", ")
            ));
        }
        Ok(Self {
            name: name.to_string(),
            premises,
            conclusion,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn premises(&self) -> &[Predicate] {
        &self.premises
    }

    pub fn conclusion(&self) -> &Predicate {
        &self.conclusion
    }

    /// Apply a substitution to every term of the rule.
    ///
    /// Range restriction survives instantiation: a conclusion variable left
    /// unbound is left unbound in the premises too.
    pub fn instantiate(&self, subst: &Substitution) -> Rule {
        Rule {
            name: self.name.clone(),
            premises: self.premises.iter().map(|p| p.substitute(subst)).collect(),
            conclusion: self.conclusion.substitute(subst),
        }
    }

    /// Copy with every variable renamed into a per-rule namespace, so rules
    /// that happen to reuse variable names cannot capture each other's
    /// bindings during one chaining run.
    pub(crate) fn standardize_apart(&self, tag: usize) -> Rule {
        let rename = |name: &str| format!("{}#{}", name, tag);
        Rule {
            name: self.name.clone(),
            premises: self
                .premises
                .iter()
                .map(|p| p.rename_vars(&rename))
                .collect(),
            conclusion: self.conclusion.rename_vars(&rename),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- ", self.conclusion)?;
        for (i, premise) in self.premises.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", premise)?;
        }
        write!(f, ".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unify_symbols() {
        let subst = Substitution::new();
        assert!(subst
            .unify(&Term::sym("hello"), &Term::sym("hello"))
            .is_some());
        assert!(subst
            .unify(&Term::sym("hello"), &Term::sym("world"))
            .is_none());
    }

    #[test]
    fn test_unify_variable_binding() {
        let subst = Substitution::new();
        let result = subst
            .unify(&Term::var("x"), &Term::sym("value"))
            .unwrap();
        assert_eq!(result.lookup("x"), Some(Term::sym("value")));
    }

    #[test]
    fn test_unify_same_variable_is_empty() {
        let subst = Substitution::new();
        let result = subst.unify(&Term::var("x"), &Term::var("x")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_unify_compound() {
        let subst = Substitution::new();
        let t1 = Term::pred("f", vec![Term::var("x"), Term::sym("b")]);
        let t2 = Term::pred("f", vec![Term::sym("a"), Term::sym("b")]);
        let result = subst.unify(&t1, &t2).unwrap();
        assert_eq!(result.lookup("x"), Some(Term::sym("a")));
    }

    #[test]
    fn test_unify_name_and_arity_mismatch() {
        let subst = Substitution::new();
        let f1 = Term::pred("f", vec![Term::sym("a")]);
        let g1 = Term::pred("g", vec![Term::sym("a")]);
        let f2 = Term::pred("f", vec![Term::sym("a"), Term::sym("b")]);
        assert!(subst.unify(&f1, &g1).is_none());
        assert!(subst.unify(&f1, &f2).is_none());
    }

    #[test]
    fn test_occurs_check() {
        let subst = Substitution::new();
        let var = Term::var("x");
        let cyclic = Term::pred("f", vec![Term::var("x")]);
        assert!(subst.unify(&var, &cyclic).is_none());
        assert!(subst.unify(&cyclic, &var).is_none());
    }

    #[test]
    fn test_unification_soundness() {
        // Any returned substitution makes both sides structurally equal.
        let t1 = Term::pred(
            "f",
            vec![Term::var("x"), Term::pred("g", vec![Term::var("y")])],
        );
        let t2 = Term::pred(
            "f",
            vec![Term::sym("a"), Term::pred("g", vec![Term::sym("b")])],
        );
        let subst = Substitution::new().unify(&t1, &t2).unwrap();
        assert_eq!(subst.resolve(&t1), subst.resolve(&t2));
    }

    #[test]
    fn test_unified_terms_reunify_empty() {
        let t1 = Term::pred("f", vec![Term::var("x"), Term::var("y")]);
        let t2 = Term::pred("f", vec![Term::sym("a"), Term::var("x")]);
        let subst = Substitution::new().unify(&t1, &t2).unwrap();
        let r1 = subst.resolve(&t1);
        let r2 = subst.resolve(&t2);
        let again = Substitution::new().unify(&r1, &r2).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_substitution_idempotent() {
        // Chained bindings (x -> y, y -> a) resolve to a fixed point.
        let t1 = Term::pred("f", vec![Term::var("x"), Term::var("y")]);
        let t2 = Term::pred("f", vec![Term::var("y"), Term::sym("a")]);
        let subst = Substitution::new().unify(&t1, &t2).unwrap();
        let once = subst.resolve(&t1);
        let twice = subst.resolve(&once);
        assert_eq!(once, twice);
        assert!(once.is_ground());
    }

    #[test]
    fn test_rule_range_restriction() {
        let premise = Predicate::new("birth", vec![Term::var("p"), Term::var("d")]);
        let ok = Predicate::new("seen", vec![Term::var("p")]);
        assert!(Rule::new("ok", vec![premise.clone()], ok).is_ok());

        let bad = Predicate::new("seen", vec![Term::var("q")]);
        let err = Rule::new("bad", vec![premise], bad);
        assert!(err.is_err());
        assert!(err.unwrap_err().to_string().contains("q"));
    }

    #[test]
    fn test_rule_display() {
        let rule = Rule::new(
            "demo",
            vec![Predicate::new(
                "birth",
                vec![Term::var("p"), Term::var("d")],
            )],
            Predicate::new("seen", vec![Term::var("p")]),
        )
        .unwrap();
        assert_eq!(rule.to_string(), "seen(?p) :- birth(?p, ?d).");
    }

    #[test]
    fn test_rule_instantiation() {
        let rule = Rule::new(
            "demo",
            vec![Predicate::new(
                "birth",
                vec![Term::var("p"), Term::var("d")],
            )],
            Predicate::new("seen", vec![Term::var("p")]),
        )
        .unwrap();
        let subst = Substitution::new()
            .unify(&Term::var("p"), &Term::sym("Alice"))
            .unwrap();
        let instantiated = rule.instantiate(&subst);
        assert_eq!(instantiated.conclusion().args[0], Term::sym("Alice"));
        assert_eq!(instantiated.premises()[0].args[0], Term::sym("Alice"));
        assert_eq!(instantiated.premises()[0].args[1], Term::var("d"));
    }

    #[test]
    fn test_standardize_apart_keeps_structure() {
        let rule = Rule::new(
            "demo",
            vec![Predicate::new(
                "birth",
                vec![Term::var("p"), Term::var("d")],
            )],
            Predicate::new("seen", vec![Term::var("p")]),
        )
        .unwrap();
        let renamed = rule.standardize_apart(3);
        assert_eq!(renamed.premises()[0].args[0], Term::var("p#3"));
        assert_eq!(renamed.conclusion().args[0], Term::var("p#3"));
    }
}
