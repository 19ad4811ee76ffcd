//! The default permission-code catalog.
//!
//! Codes are data: Spanish slugs, exactly as the dashboards send them.
//! The catalog table is authoritative at runtime; these constants exist
//! so seeding and call sites never typo a code.

pub const INVENTARIO_LEER: &str = "inventario_leer";
pub const INVENTARIO_CREAR: &str = "inventario_crear";
pub const INVENTARIO_EDITAR: &str = "inventario_editar";
pub const INVENTARIO_ELIMINAR: &str = "inventario_eliminar";

pub const TRABAJADORES_LEER: &str = "trabajadores_leer";
pub const TRABAJADORES_CREAR: &str = "trabajadores_crear";
pub const TRABAJADORES_EDITAR: &str = "trabajadores_editar";
pub const TRABAJADORES_ELIMINAR: &str = "trabajadores_eliminar";

pub const FOTOCOPIAS_LEER: &str = "fotocopias_leer";
pub const FOTOCOPIAS_CREAR: &str = "fotocopias_crear";
pub const FOTOCOPIAS_EDITAR: &str = "fotocopias_editar";
pub const FOTOCOPIAS_ELIMINAR: &str = "fotocopias_eliminar";

pub const GRUPOS_ADMINISTRAR: &str = "grupos_administrar";
pub const REPORTES_VER: &str = "reportes_ver";

/// Every code seeded into a fresh catalog.
pub const DEFAULT_CATALOG: &[&str] = &[
    INVENTARIO_LEER,
    INVENTARIO_CREAR,
    INVENTARIO_EDITAR,
    INVENTARIO_ELIMINAR,
    TRABAJADORES_LEER,
    TRABAJADORES_CREAR,
    TRABAJADORES_EDITAR,
    TRABAJADORES_ELIMINAR,
    FOTOCOPIAS_LEER,
    FOTOCOPIAS_CREAR,
    FOTOCOPIAS_EDITAR,
    FOTOCOPIAS_ELIMINAR,
    GRUPOS_ADMINISTRAR,
    REPORTES_VER,
];

/// Default roles and their grants, seeded alongside the catalog.
pub const DEFAULT_ROLES: &[(&str, &[&str])] = &[
    ("administrador", DEFAULT_CATALOG),
    (
        "empleado",
        &[
            INVENTARIO_LEER,
            FOTOCOPIAS_LEER,
            FOTOCOPIAS_CREAR,
        ],
    ),
];
