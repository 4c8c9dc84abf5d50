//! `.xlsx` generation.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use common::errors::{AppError, AppResult};

use crate::layout::{Coluna, Modelo};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const HEADER_FILL: u32 = 0x4F81BD;

/// Longest text Excel accepts in one cell, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Cuts `valor` to the cell limit on a char boundary.
fn cabe_na_celula(valor: &str) -> &str {
    match valor.char_indices().nth(MAX_CELL_CHARS) {
        Some((corte, _)) => &valor[..corte],
        None => valor,
    }
}

fn xlsx_error(err: XlsxError) -> AppError {
    AppError::Internal(format!("Falha ao gerar a planilha: {err}"))
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
}

/// Single-sheet workbook written row by row below a styled header.
pub struct Planilha {
    worksheet: Worksheet,
    proxima_linha: u32,
}

impl Planilha {
    pub fn new(nome: &str, colunas: &[Coluna]) -> AppResult<Self> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(nome).map_err(xlsx_error)?;

        let header = header_format();
        for (i, coluna) in colunas.iter().enumerate() {
            let col = i as u16;
            worksheet
                .write_string_with_format(0, col, coluna.header, &header)
                .map_err(xlsx_error)?;
            worksheet
                .set_column_width(col, coluna.width)
                .map_err(xlsx_error)?;
        }

        Ok(Self {
            worksheet,
            proxima_linha: 1,
        })
    }

    /// Appends one row; empty values leave the cell blank and oversized ones are truncated.
    pub fn push<S: AsRef<str>>(&mut self, valores: &[S]) -> AppResult<()> {
        let row = self.proxima_linha;
        for (i, valor) in valores.iter().enumerate() {
            let valor = cabe_na_celula(valor.as_ref());
            if valor.is_empty() {
                continue;
            }
            self.worksheet
                .write_string(row, i as u16, valor)
                .map_err(xlsx_error)?;
        }
        self.proxima_linha += 1;
        Ok(())
    }

    /// Data rows written so far.
    pub fn linhas(&self) -> u32 {
        self.proxima_linha - 1
    }

    pub fn into_bytes(self) -> AppResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.worksheet);
        workbook.save_to_buffer().map_err(xlsx_error)
    }
}

/// Template workbook for `modelo`.
pub fn planilha_modelo(modelo: &Modelo) -> AppResult<Vec<u8>> {
    let mut planilha = Planilha::new(
        modelo.sheet,
        &[Coluna {
            header: modelo.header,
            width: modelo.width,
        }],
    )?;
    for exemplo in modelo.exemplos {
        planilha.push(&[exemplo])?;
    }
    planilha.into_bytes()
}
