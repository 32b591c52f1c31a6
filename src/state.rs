use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

use ahash::{HashMap, HashMapExt};
use append_only_vec::AppendOnlyVec;
use once_cell::sync::Lazy;
use smartstring::alias::String;

static STATE: Lazy<RwLock<State>> = Lazy::new(|| RwLock::new(State::new()));
static ID_TO_VAR: AppendOnlyVec<VariableInfo> = AppendOnlyVec::<VariableInfo>::new();

/// The domain a variable ranges over.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum VariableDomain {
    Real,
    Integer,
    Boolean,
    Uninterpreted,
}

/// A variable with a process-wide unique id.
///
/// Equality, hashing and ordering only consider the id.
#[derive(Clone, Copy, Debug)]
pub struct Variable {
    id: u32,
    domain: VariableDomain,
}

impl Variable {
    #[inline]
    pub fn get_id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn get_domain(&self) -> VariableDomain {
        self.domain
    }

    /// Get the name of the variable. See [State::get_name].
    pub fn get_name(&self, friendly: bool) -> std::string::String {
        State::get_name(*self, friendly)
    }
}

impl PartialEq for Variable {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Variable {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&State::get_name(*self, true))
    }
}

struct VariableInfo {
    name: Option<String>,
    domain: VariableDomain,
}

/// A global registry that hands out variables and stores their names.
pub struct State {
    str_to_id: HashMap<String, Variable>,
}

impl State {
    fn new() -> State {
        State {
            str_to_id: HashMap::new(),
        }
    }

    /// Create a new variable. A named variable is registered under its
    /// name, so that it can be retrieved with [State::get_variable].
    ///
    /// # Panics
    ///
    /// Panics when the name is already taken.
    pub fn fresh_variable(name: Option<&str>, domain: VariableDomain) -> Variable {
        // the lock is released before a panic, so that the state is not poisoned
        let var = STATE.write().unwrap().fresh_variable_impl(name, domain);
        match var {
            Ok(v) => v,
            Err(e) => panic!("{}", e),
        }
    }

    fn fresh_variable_impl(
        &mut self,
        name: Option<&str>,
        domain: VariableDomain,
    ) -> Result<Variable, std::string::String> {
        if ID_TO_VAR.len() >= u32::MAX as usize - 1 {
            panic!("Too many variables defined");
        }

        match name {
            Some(name) => match self.str_to_id.entry(name.into()) {
                Entry::Occupied(_) => Err(format!("Variable {} is already defined", name)),
                Entry::Vacant(v) => {
                    // there is no synchronization issue since only one thread can insert at a time
                    // as the state itself is behind a lock
                    let id = ID_TO_VAR.push(VariableInfo {
                        name: Some(name.into()),
                        domain,
                    });
                    let var = Variable {
                        id: id as u32,
                        domain,
                    };
                    v.insert(var);
                    Ok(var)
                }
            },
            None => {
                let id = ID_TO_VAR.push(VariableInfo { name: None, domain });
                Ok(Variable {
                    id: id as u32,
                    domain,
                })
            }
        }
    }

    /// Get the variable registered under `name`, creating a real variable
    /// if the name is unknown.
    pub fn get_variable<S: AsRef<str>>(name: S) -> Variable {
        if let Some(v) = STATE.read().unwrap().str_to_id.get(name.as_ref()) {
            return *v;
        }

        let mut state = STATE.write().unwrap();
        // another thread may have registered it in the meantime
        if let Some(v) = state.str_to_id.get(name.as_ref()) {
            return *v;
        }

        match state.fresh_variable_impl(Some(name.as_ref()), VariableDomain::Real) {
            Ok(v) => v,
            Err(e) => unreachable!("{}", e),
        }
    }

    /// Look up a variable by id.
    pub fn get_variable_by_id(id: u32) -> Option<Variable> {
        if (id as usize) < ID_TO_VAR.len() {
            Some(Variable {
                id,
                domain: ID_TO_VAR[id as usize].domain,
            })
        } else {
            None
        }
    }

    /// Get the name of a variable. A friendly name is the name the variable
    /// was registered with, if any. Otherwise, and for non-friendly names,
    /// the name is `x_<id>`.
    pub fn get_name(var: Variable, friendly: bool) -> std::string::String {
        if friendly {
            if let Some(name) = &ID_TO_VAR[var.id as usize].name {
                return name.to_string();
            }
        }

        format!("x_{}", var.id)
    }

    /// The number of variables created so far.
    pub fn variable_count() -> usize {
        ID_TO_VAR.len()
    }
}

#[cfg(test)]
mod test {
    use super::{State, VariableDomain};

    #[test]
    fn fresh_variables() {
        let a = State::fresh_variable(Some("state_test_a"), VariableDomain::Integer);
        let b = State::fresh_variable(None, VariableDomain::Real);

        assert!(a < b);
        assert_ne!(a, b);
        assert_eq!(a.get_domain(), VariableDomain::Integer);
        assert_eq!(State::get_name(a, true), "state_test_a");
        assert_eq!(State::get_name(a, false), format!("x_{}", a.get_id()));
        assert_eq!(State::get_name(b, true), format!("x_{}", b.get_id()));
        assert_eq!(State::get_variable("state_test_a"), a);
        assert_eq!(State::get_variable_by_id(b.get_id()), Some(b));
    }

    #[test]
    #[should_panic]
    fn duplicate_name() {
        State::fresh_variable(Some("state_test_dup"), VariableDomain::Real);
        State::fresh_variable(Some("state_test_dup"), VariableDomain::Real);
    }
}
