//! Thompson construction: one NFA fragment per syntax tree node.

use tracing::debug;

use crate::id::IdFactory;
use crate::nfa::{Fragment, Nfa};
use crate::parser::Ast;
use crate::symbol::{Interner, Symbol};

/// Build the NFA of a whole tree with fresh ids and a fresh symbol pool.
pub fn build(ast: &Ast) -> Nfa {
    let mut ids = IdFactory::new();
    let mut symbols = Interner::new();
    let fragment = assemble(ast, &mut ids, &mut symbols);
    debug!(
        states = ids.issued(),
        classes = symbols.len(),
        "assembled nfa"
    );
    fragment.build()
}

/// Pending work while walking a tree without recursion.
enum Step<'a> {
    /// Assemble this node, or schedule its children first.
    Visit(&'a Ast),
    /// Both children of a `Concat` are on the fragment stack.
    Concat,
    Union,
    Star,
}

/// Build the fragment of `ast`, drawing state ids from `ids`.
///
/// The tree is walked with an explicit stack, children left to right, so a
/// pattern of any length assembles in constant native stack space. Ids are
/// issued in the same order a recursive post-order walk would issue them.
pub fn assemble(ast: &Ast, ids: &mut IdFactory, symbols: &mut Interner) -> Fragment {
    let mut steps = vec![Step::Visit(ast)];
    let mut fragments: Vec<Fragment> = Vec::new();

    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(ast) => match ast {
                Ast::Char(c) => fragments.push(edge(Symbol::Literal(*c), ids)),
                Ast::Klass(members) => fragments.push(edge(symbols.klass(members), ids)),
                Ast::NegatedKlass(members) => {
                    fragments.push(edge(symbols.negated_klass(members), ids))
                }
                Ast::Dot => fragments.push(edge(Symbol::Dot, ids)),
                Ast::Concat(lhs, rhs) => {
                    steps.extend([
                        Step::Concat,
                        Step::Visit(rhs.as_ref()),
                        Step::Visit(lhs.as_ref()),
                    ])
                }
                Ast::Union(lhs, rhs) => {
                    steps.extend([
                        Step::Union,
                        Step::Visit(rhs.as_ref()),
                        Step::Visit(lhs.as_ref()),
                    ])
                }
                Ast::Star(e) => steps.extend([Step::Star, Step::Visit(e.as_ref())]),
            },
            Step::Concat => {
                let (lhs, rhs) = pop_pair(&mut fragments);
                fragments.push(concat(lhs, rhs));
            }
            Step::Union => {
                let (lhs, rhs) = pop_pair(&mut fragments);
                fragments.push(union(lhs, rhs, ids));
            }
            Step::Star => {
                let inner = pop(&mut fragments);
                fragments.push(star(inner, ids));
            }
        }
    }

    pop(&mut fragments)
}

fn pop(fragments: &mut Vec<Fragment>) -> Fragment {
    match fragments.pop() {
        Some(fragment) => fragment,
        None => unreachable!("every scheduled combinator has its operands assembled"),
    }
}

fn pop_pair(fragments: &mut Vec<Fragment>) -> (Fragment, Fragment) {
    let rhs = pop(fragments);
    let lhs = pop(fragments);
    (lhs, rhs)
}

/// Fragment for a single symbol.
///
/// ```txt
/// s0 --by--> (s1)
/// ```
fn edge(by: Symbol, ids: &mut IdFactory) -> Fragment {
    let s0 = ids.next_id();
    let s1 = ids.next_id();
    let mut frag = Fragment::new(s0, vec![s1]);
    frag.connect(s0, by, s1);
    frag
}

/// Fragment for concatenation.
///
/// e1e2
/// ```txt
/// e1.start --> ... (e1.accepts) --ε--> e2.start --> ... (e2.accepts)
/// ```
fn concat(lhs: Fragment, rhs: Fragment) -> Fragment {
    let mut frag = Fragment::new(lhs.start, rhs.accepts);
    for &accept in &lhs.accepts {
        frag.connect_epsilon(accept, rhs.start);
    }
    frag.include(lhs.paths);
    frag.include(rhs.paths);
    frag
}

/// Fragment for union.
///
/// e1|e2
/// ```txt
///      ε--> e1.start --> ... (e1.accepts)
/// sN --|
///      ε--> e2.start --> ... (e2.accepts)
/// ```
fn union(lhs: Fragment, rhs: Fragment, ids: &mut IdFactory) -> Fragment {
    let s = ids.next_id();

    // Extend the longer accept list so long alternations stay linear.
    let (mut accepts, rest) = if lhs.accepts.len() >= rhs.accepts.len() {
        (lhs.accepts, rhs.accepts)
    } else {
        (rhs.accepts, lhs.accepts)
    };
    accepts.extend(rest);
    let mut frag = Fragment::new(s, accepts);
    frag.connect_epsilon(s, lhs.start);
    frag.connect_epsilon(s, rhs.start);
    frag.include(lhs.paths);
    frag.include(rhs.paths);
    frag
}

/// Fragment for the Kleene star. `sN` is itself accepting, which covers zero repetitions.
///
/// e*
/// ```txt
///             +------------ε-------------+
///             v                          |
/// (sN) --ε--> e.start --> ... (e.accepts)
/// ```
fn star(inner: Fragment, ids: &mut IdFactory) -> Fragment {
    let s = ids.next_id();

    let mut accepts = inner.accepts.clone();
    accepts.push(s);
    let mut frag = Fragment::new(s, accepts);
    for &accept in &inner.accepts {
        frag.connect_epsilon(accept, inner.start);
    }
    frag.connect_epsilon(s, inner.start);
    frag.include(inner.paths);
    frag
}
