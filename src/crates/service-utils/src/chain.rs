//! Immutable, chainable error values.
//!
//! An [`ErrorChain`] is a handle to one node of a singly linked list of
//! annotations. Every annotation returns a *new* chain that points at the
//! previous one, so a chain can be shared across threads and annotated
//! independently by each holder.
//!
//! ```rust
//! use service_utils::ErrorChain;
//!
//! let err = ErrorChain::new("Failed to open file");
//! let a = err.add_context("Component A");
//! let b = a.add_context_fmt(format_args!("Component {} code={}", "B", 123));
//!
//! assert_eq!(b.to_string(), "Component B code=123: Component A: Failed to open file");
//! assert_eq!(b.root_cause_str(), "Failed to open file");
//! assert!(b.is(&err));
//! assert!(!err.is(&b));
//! ```
//!
//! Context layers only prefix the message. Stack-trace layers render the same
//! way but also record the caller [`Location`] and a [`Backtrace`] (captured
//! when `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` enables it).

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use thiserror::Error;

/// Shared, thread-safe error object.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// An immutable error with layered annotations.
///
/// Cloning is cheap and preserves identity: a clone [`is`](Self::is) the
/// original and vice versa.
#[derive(Clone)]
pub struct ErrorChain {
    node: Arc<Node>,
}

enum Node {
    Message(Message),
    Foreign(SharedError),
    Wrapped(ErrorChain),
    Context(ContextLayer),
    Trace(TraceLayer),
}

/// Leaf payload created by [`ErrorChain::new`] and [`ErrorChain::new_fmt`].
#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

#[derive(Debug, Error)]
#[error("{message}: {cause}")]
struct ContextLayer {
    message: String,
    #[source]
    cause: ErrorChain,
}

#[derive(Debug, Error)]
#[error("{message}: {cause}")]
struct TraceLayer {
    message: String,
    site: CallSite,
    #[source]
    cause: ErrorChain,
}

/// Where a stack-trace layer was added.
#[derive(Debug)]
struct CallSite {
    location: &'static Location<'static>,
    backtrace: Backtrace,
}

impl ErrorChain {
    fn from_node(node: Node) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// Create a root error whose message is exactly `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_node(Node::Message(Message(message.into())))
    }

    /// Create a root error from pre-formatted arguments.
    ///
    /// Placeholders follow `format_args!`; argument mismatches are compile
    /// errors rather than runtime suffixes. See also [`chain_error!`](crate::chain_error).
    pub fn new_fmt(args: fmt::Arguments<'_>) -> Self {
        Self::new(fmt::format(args))
    }

    /// Wrap an existing error without changing its message.
    ///
    /// The result takes the identity of `err`:
    /// - wrapping an `ErrorChain` keeps it walkable, and the result [`is`](Self::is)
    ///   the inner chain and anything derived from it;
    /// - wrapping a [`SharedError`] behaves like [`wrap_shared`](Self::wrap_shared);
    /// - any other error is moved in, so each call is a new identity.
    pub fn wrap<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let boxed: Box<dyn StdError + Send + Sync + 'static> = Box::new(err);
        match boxed.downcast::<ErrorChain>() {
            Ok(chain) => Self::from_node(Node::Wrapped(*chain)),
            Err(other) => Self::foreign(other),
        }
    }

    fn foreign(err: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        match err.downcast::<SharedError>() {
            Ok(shared) => Self::wrap_shared(*shared),
            Err(other) => Self::wrap_shared(Arc::from(other)),
        }
    }

    /// Wrap an error that is already shared.
    ///
    /// Chains wrapping the same `Arc` are considered the same root cause by
    /// [`is`](Self::is).
    pub fn wrap_shared(err: SharedError) -> Self {
        Self::from_node(Node::Foreign(err))
    }

    /// Prefix the message with `message`.
    pub fn add_context(&self, message: impl fmt::Display) -> Self {
        Self::from_node(Node::Context(ContextLayer {
            message: message.to_string(),
            cause: self.clone(),
        }))
    }

    /// Prefix the message with formatted arguments.
    pub fn add_context_fmt(&self, args: fmt::Arguments<'_>) -> Self {
        self.add_context(args)
    }

    /// Prefix the message with `message` and record where it happened.
    #[track_caller]
    pub fn add_stack_trace(&self, message: impl fmt::Display) -> Self {
        Self::from_node(Node::Trace(TraceLayer {
            message: message.to_string(),
            site: CallSite {
                location: Location::caller(),
                backtrace: Backtrace::capture(),
            },
            cause: self.clone(),
        }))
    }

    /// Formatted variant of [`add_stack_trace`](Self::add_stack_trace).
    #[track_caller]
    pub fn add_stack_trace_fmt(&self, args: fmt::Arguments<'_>) -> Self {
        self.add_stack_trace(args)
    }

    /// The value wrapped by this node, one level down.
    ///
    /// Suitable for handing to a logging sink: it renders the same message
    /// as the chain and exposes the rest of the chain through `source()`.
    pub fn detail(&self) -> &(dyn StdError + Send + Sync + 'static) {
        match &*self.node {
            Node::Message(message) => message,
            Node::Foreign(err) => err.as_ref(),
            Node::Wrapped(inner) => inner,
            Node::Context(layer) => layer,
            Node::Trace(layer) => layer,
        }
    }

    /// The innermost node of the chain.
    pub fn root_cause(&self) -> ErrorChain {
        let mut current = self;
        while let Some(next) = current.cause() {
            current = next;
        }
        current.clone()
    }

    /// Message of the innermost node.
    pub fn root_cause_str(&self) -> String {
        self.root_cause().to_string()
    }

    /// Whether `target` is this chain or one of its ancestors.
    ///
    /// Comparison is by identity, never by message text. A wrapped chain has
    /// the identity of the chain it wraps, and wrapped foreign errors compare
    /// by the address of the shared error.
    pub fn is(&self, target: &ErrorChain) -> bool {
        let target = target.identity();
        self.iter().any(|node| node.identity() == target)
    }

    /// Iterate from this node down to the root cause.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: Some(self),
        }
    }

    /// Caller location recorded by a stack-trace layer.
    pub fn location(&self) -> Option<&'static Location<'static>> {
        match &*self.node {
            Node::Trace(layer) => Some(layer.site.location),
            _ => None,
        }
    }

    /// Backtrace recorded by a stack-trace layer.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match &*self.node {
            Node::Trace(layer) => Some(&layer.site.backtrace),
            _ => None,
        }
    }

    /// True for `new`/`new_fmt` leaves and wrapped foreign errors.
    pub fn is_root(&self) -> bool {
        self.cause().is_none()
    }

    fn cause(&self) -> Option<&ErrorChain> {
        match &*self.node {
            Node::Message(_) | Node::Foreign(_) => None,
            Node::Wrapped(inner) => Some(inner),
            Node::Context(layer) => Some(&layer.cause),
            Node::Trace(layer) => Some(&layer.cause),
        }
    }

    fn identity(&self) -> *const () {
        match &*self.node {
            Node::Wrapped(inner) => inner.identity(),
            Node::Foreign(err) => Arc::as_ptr(err) as *const (),
            _ => Arc::as_ptr(&self.node) as *const (),
        }
    }

    fn is_wrapper(&self) -> bool {
        matches!(&*self.node, Node::Wrapped(_))
    }

    /// This layer's own text, without its cause.
    fn layer_message(&self) -> String {
        match &*self.node {
            Node::Message(message) => message.0.clone(),
            Node::Foreign(err) => err.to_string(),
            Node::Wrapped(inner) => inner.layer_message(),
            Node::Context(layer) => layer.message.clone(),
            Node::Trace(layer) => layer.message.clone(),
        }
    }
}

impl fmt::Display for ErrorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.node {
            Node::Message(message) => fmt::Display::fmt(message, f),
            Node::Foreign(err) => fmt::Display::fmt(err, f),
            Node::Wrapped(inner) => fmt::Display::fmt(inner, f),
            Node::Context(layer) => fmt::Display::fmt(layer, f),
            Node::Trace(layer) => fmt::Display::fmt(layer, f),
        }
    }
}

impl fmt::Debug for ErrorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self)?;
        for (depth, node) in self.iter().filter(|node| !node.is_wrapper()).enumerate() {
            write!(f, "  {}: {}", depth, node.layer_message())?;
            if let Some(location) = node.location() {
                write!(f, " (at {})", location)?;
            }
            writeln!(f)?;
        }
        if f.alternate() {
            for node in self.iter() {
                if let Some(backtrace) = node.backtrace() {
                    if backtrace.status() == BacktraceStatus::Captured {
                        writeln!(f, "\nBacktrace for \"{}\":\n{}", node.layer_message(), backtrace)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl StdError for ErrorChain {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &*self.node {
            Node::Message(_) => None,
            Node::Foreign(err) => err.source(),
            Node::Wrapped(inner) => inner.source(),
            Node::Context(layer) => Some(&layer.cause),
            Node::Trace(layer) => Some(&layer.cause),
        }
    }
}

/// Iterator over the nodes of a chain, outermost first.
pub struct Iter<'a> {
    next: Option<&'a ErrorChain>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ErrorChain;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause();
        Some(current)
    }
}

/// Turn any error into a chain, reusing it if it already is one.
fn into_chain<E>(err: E) -> ErrorChain
where
    E: StdError + Send + Sync + 'static,
{
    let boxed: Box<dyn StdError + Send + Sync + 'static> = Box::new(err);
    match boxed.downcast::<ErrorChain>() {
        Ok(chain) => *chain,
        Err(other) => ErrorChain::foreign(other),
    }
}

/// Annotate the error side of a `Result` while propagating it.
///
/// ```rust
/// use service_utils::chain::{ErrorChain, ResultExt};
///
/// fn open() -> Result<(), ErrorChain> {
///     std::fs::read("/definitely/not/here").context("Failed to open file")?;
///     Ok(())
/// }
///
/// let err = open().unwrap_err();
/// assert!(err.to_string().starts_with("Failed to open file: "));
/// ```
pub trait ResultExt<T> {
    /// Add a context layer to the error.
    fn context<D: fmt::Display>(self, message: D) -> Result<T, ErrorChain>;

    /// Add a lazily built context layer to the error.
    fn with_context<D, F>(self, f: F) -> Result<T, ErrorChain>
    where
        D: fmt::Display,
        F: FnOnce() -> D;

    /// Add a stack-trace layer to the error.
    fn stack_trace<D: fmt::Display>(self, message: D) -> Result<T, ErrorChain>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<D: fmt::Display>(self, message: D) -> Result<T, ErrorChain> {
        self.map_err(|err| into_chain(err).add_context(message))
    }

    fn with_context<D, F>(self, f: F) -> Result<T, ErrorChain>
    where
        D: fmt::Display,
        F: FnOnce() -> D,
    {
        self.map_err(|err| into_chain(err).add_context(f()))
    }

    #[track_caller]
    fn stack_trace<D: fmt::Display>(self, message: D) -> Result<T, ErrorChain> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(into_chain(err).add_stack_trace(message)),
        }
    }
}

/// Build a root [`ErrorChain`] from a format string.
///
/// ```rust
/// let err = service_utils::chain_error!("Failed to open file={}", "test.csv");
/// assert_eq!(err.to_string(), "Failed to open file=test.csv");
/// ```
#[macro_export]
macro_rules! chain_error {
    ($($arg:tt)*) => {
        $crate::chain::ErrorChain::new_fmt(format_args!($($arg)*))
    };
}
