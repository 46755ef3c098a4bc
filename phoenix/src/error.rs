use crate::TypeKey;

/// Type alias for boxed errors that can be sent across threads.
///
/// Constructors return this error type, and it is the error type of the
/// configuration helpers built on top of the container.
pub type StdError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a registration or resolution.
#[derive(Debug)]
pub enum ContainerError {
    /// No binding exists for the requested contract.
    NotRegistered { contract: TypeKey },
    /// The implementation marks more than one constructor as preferred.
    AmbiguousConstructor { implementation: TypeKey },
    /// The binding has no descriptor or the descriptor declares no constructor.
    NoConstructor { implementation: TypeKey },
    /// A contract was requested again while it was still being built.
    CyclicDependency { path: Vec<TypeKey> },
    /// An override value does not match the contract of the parameter it replaces.
    OverrideMismatch {
        parameter: String,
        expected: TypeKey,
        found: TypeKey,
    },
    /// A constructor pulled an argument with a contract other than the one supplied.
    ArgumentMismatch {
        implementation: TypeKey,
        parameter: &'static str,
        expected: TypeKey,
    },
    /// The built object could not be converted into the bound contract.
    ContractMismatch {
        contract: TypeKey,
        implementation: TypeKey,
    },
    /// The constructor itself returned an error.
    Construction {
        implementation: TypeKey,
        source: StdError,
    },
    /// The process-wide default container has already been created.
    AlreadyInitialized,
}

impl std::fmt::Display for ContainerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerError::NotRegistered { contract } => write!(
                f,
                "Type {contract} could not be resolved, because it was not registered"
            ),
            ContainerError::AmbiguousConstructor { implementation } => write!(
                f,
                "Type {implementation} must not have multiple preferred constructors"
            ),
            ContainerError::NoConstructor { implementation } => {
                write!(f, "Type {implementation} has no constructor")
            }
            ContainerError::CyclicDependency { path } => {
                write!(f, "Cyclic dependency detected: ")?;
                for (i, key) in path.iter().enumerate() {
                    if i > 0 {
                        write!(f, " -> ")?;
                    }
                    write!(f, "{key}")?;
                }
                Ok(())
            }
            ContainerError::OverrideMismatch {
                parameter,
                expected,
                found,
            } => write!(
                f,
                "Override for parameter {parameter} has type {found}, expected {expected}"
            ),
            ContainerError::ArgumentMismatch {
                implementation,
                parameter,
                expected,
            } => write!(
                f,
                "Argument {parameter} of {implementation} is not of type {expected}"
            ),
            ContainerError::ContractMismatch {
                contract,
                implementation,
            } => write!(f, "Type {implementation} does not implement {contract}"),
            ContainerError::Construction {
                implementation,
                source,
            } => write!(f, "Cannot construct {implementation}: {source}"),
            ContainerError::AlreadyInitialized => {
                write!(f, "Default container is already initialized")
            }
        }
    }
}

impl std::error::Error for ContainerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContainerError::Construction { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Non-fatal failure to read or assign an import property.
#[derive(Debug)]
pub enum PropertyError {
    /// The property cannot be read or written.
    Inaccessible(String),
    /// The property was assigned concurrently before the container got to it.
    AlreadySet,
    /// The object or value does not have the type the accessor expects.
    TypeMismatch { expected: TypeKey },
}

impl PropertyError {
    pub fn inaccessible(reason: impl Into<String>) -> Self {
        Self::Inaccessible(reason.into())
    }
}

impl std::fmt::Display for PropertyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyError::Inaccessible(reason) => write!(f, "Property is inaccessible: {reason}"),
            PropertyError::AlreadySet => write!(f, "Property is already set"),
            PropertyError::TypeMismatch { expected } => {
                write!(f, "Property accessor expected {expected}")
            }
        }
    }
}

impl std::error::Error for PropertyError {}
